//! Directive Parser Tests
//!
//! Properties of the script grammar: idempotent re-parsing and the
//! position-independent config pre-pass.

use flatland_core::{
    parse_document, parse_script, render_script, split_script, ActorProfile, ActorProfileRegistry,
    ColorName, Directive, Shape,
};

const SCRIPTS: &[&str] = &[
    "BARRY: Hi.\nCARL: Yo.\n[LAUGH]",
    "  barry :  spaced out   \n\n[ scene : forest ]\n[config: carl , star, gold]\n[FooBar]",
    "NARRATOR: It was 5:30 in the morning.\n[SILENCE]\nCARL:\n[SCENE: UNKNOWNPLACE]",
    "[CONFIG: BARRY, TRIANGLE]\njust some prose\n[]\nBARRY: [not a cue]",
    "SFX: [LAUGH]\n[BOO]\nsfx: [SILENCE]",
];

/// Re-parsing the reconstructed text yields the same directives.
#[test]
fn reparsing_reconstructed_text_is_idempotent() {
    for script in SCRIPTS {
        let first = parse_script(script);
        let second = parse_script(&render_script(&first));
        assert_eq!(first, second, "script {:?} did not round-trip", script);
    }
}

/// Going through the persisted record list gives the same directives as
/// parsing the text directly.
#[test]
fn record_handoff_preserves_directives() {
    for script in SCRIPTS {
        let doc = split_script(script);
        let json = doc.to_json().unwrap();
        let reloaded = flatland_schema::ScriptDocument::from_json(&json).unwrap();
        assert_eq!(parse_document(&reloaded), parse_script(script));
    }
}

/// A character called SFX speaks dialogue; only a fully bracketed line is a cue.
#[test]
fn sfx_speaker_is_dialogue() {
    assert_eq!(
        parse_script("SFX: [LAUGH]"),
        vec![Directive::Dialogue {
            speaker: "SFX".to_string(),
            text: "[LAUGH]".to_string(),
        }]
    );

    let spoken = vec![Directive::Dialogue {
        speaker: "SFX".to_string(),
        text: "[BOO]".to_string(),
    }];
    assert_eq!(parse_script(&render_script(&spoken)), spoken);
    assert_eq!(parse_document(&split_script("SFX: [BOO]")), spoken);
}

/// Every non-empty line maps to at most one directive, in input order.
#[test]
fn directives_keep_input_order() {
    let parsed = parse_script("CARL: one\n[BOO]\nBARRY: two\n[SCENE: CITY]");
    let kinds: Vec<&str> = parsed
        .iter()
        .map(|d| match d {
            Directive::Dialogue { .. } => "dialogue",
            Directive::SoundEffect { .. } => "sfx",
            Directive::SceneChange { .. } => "scene",
            Directive::ActorConfig { .. } => "config",
        })
        .collect();
    assert_eq!(kinds, vec!["dialogue", "sfx", "dialogue", "scene"]);
}

/// A config cue changes the secondary actor whether it comes before,
/// between or after that actor's lines.
#[test]
fn config_applies_regardless_of_position() {
    let expected = ActorProfile::new(Shape::Triangle, ColorName::Green);
    let scripts = [
        "[CONFIG: CARL, TRIANGLE, GREEN]\nCARL: Hi.\nCARL: Bye.",
        "CARL: Hi.\n[CONFIG: CARL, TRIANGLE, GREEN]\nCARL: Bye.",
        "CARL: Hi.\nCARL: Bye.\n[CONFIG: CARL, TRIANGLE, GREEN]",
    ];

    for script in scripts {
        let directives = parse_script(script);
        let cast = ActorProfileRegistry::from_directives("BARRY", "CARL", &directives);
        assert_eq!(cast.secondary().profile, expected, "script {:?}", script);
        assert_eq!(
            cast.primary().profile,
            ActorProfile::new(Shape::Square, ColorName::Red)
        );
    }
}

/// A malformed config cue leaves the profile untouched.
#[test]
fn malformed_config_is_ignored() {
    let directives = parse_script("[CONFIG: CARL, TRIANGLE]\nCARL: Hi.");
    let cast = ActorProfileRegistry::from_directives("BARRY", "CARL", &directives);
    assert_eq!(
        cast.secondary().profile,
        ActorProfile::new(Shape::Circle, ColorName::Blue)
    );
}
