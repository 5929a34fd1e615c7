//! Timeline Builder Tests
//!
//! Event ordering, durations and the handling of unknown cues.

use flatland_core::sfx::AssetSource;
use flatland_core::timeline::AudioRef;
use flatland_core::voice::VoiceAsset;
use flatland_core::{
    parse_script, ActorProfileRegistry, ActorRef, Color, EventKind, SfxAsset, SfxLibrary, SfxTag,
    Timeline, TimelineBuilder, UnknownCuePolicy, VoiceCache,
};
use std::path::PathBuf;

fn laugh_library() -> SfxLibrary {
    let mut library = SfxLibrary::default();
    library.insert(SfxAsset {
        tag: SfxTag::Laugh,
        path: Some(PathBuf::from("sfx/laugh.mp3")),
        duration_seconds: 4.0,
        source: AssetSource::Cache,
    });
    library
}

fn build(script: &str, policy: UnknownCuePolicy) -> Timeline {
    let directives = parse_script(script);
    let cast = ActorProfileRegistry::from_directives("BARRY", "CARL", &directives);
    TimelineBuilder::new(&cast, &laugh_library(), &VoiceCache::default())
        .with_policy(policy)
        .build(&directives)
}

/// The reference two-line sitcom exchange.
#[test]
fn two_lines_and_a_laugh() {
    let timeline = build("BARRY: Hi.\nCARL: Yo.\n[LAUGH]", UnknownCuePolicy::Drop);

    assert_eq!(
        timeline.kinds(),
        vec![
            EventKind::FocusA,
            EventKind::PlayLine,
            EventKind::FocusB,
            EventKind::PlayLine,
            EventKind::PlaySfx,
        ]
    );

    let events = &timeline.events;
    assert_eq!(events[0].camera_target, Some(ActorRef::Primary));
    assert_eq!(events[1].duration_seconds, 1.5);
    assert_eq!(events[2].camera_target, Some(ActorRef::Secondary));
    assert_eq!(events[3].duration_seconds, 1.5);
    assert_eq!(events[4].duration_seconds, 4.0);
    assert_eq!(events[4].sfx_tag(), Some(SfxTag::Laugh));
    assert_eq!(
        events[4].audio_ref.as_ref().and_then(|a| a.path()),
        Some(PathBuf::from("sfx/laugh.mp3").as_path())
    );
}

/// Line duration is `max(1.5, chars / 14)`.
#[test]
fn long_line_duration() {
    let text = "x".repeat(140);
    let timeline = build(&format!("BARRY: {}", text), UnknownCuePolicy::Drop);
    assert_eq!(timeline.events[1].duration_seconds, 10.0);
}

/// Unknown bracket tags produce no events under either policy.
#[test]
fn unknown_cue_produces_no_events() {
    let dropped = build("[FOOBAR]", UnknownCuePolicy::Drop);
    assert!(dropped.is_empty());
    assert!(dropped.warnings.is_empty());

    let warned = build("[FOOBAR]", UnknownCuePolicy::Warn);
    assert!(warned.is_empty());
    assert_eq!(warned.warnings.len(), 1);
    assert!(warned.warnings[0].contains("FOOBAR"));
}

/// Warnings name the position in the directive list, which blank and
/// unparseable script lines do not advance.
#[test]
fn unknown_cue_warning_names_directive_index() {
    let timeline = build("\nprose without a speaker\n\nBARRY: Hi.\n[FOOBAR]", UnknownCuePolicy::Warn);
    assert_eq!(timeline.warnings, vec!["directive 1: unknown cue [FOOBAR] was dropped".to_string()]);
}

/// Config cues never interrupt the flow.
#[test]
fn config_cue_emits_nothing() {
    let timeline = build("[CONFIG: CARL, STAR, GOLD]", UnknownCuePolicy::Drop);
    assert!(timeline.is_empty());
}

/// Scene names resolve through the palette, with a default fallback.
#[test]
fn scene_colors() {
    let timeline = build("[SCENE: FOREST]\n[SCENE: RED]\n[SCENE: UNKNOWNPLACE]", UnknownCuePolicy::Drop);
    let colors: Vec<String> = timeline
        .events
        .iter()
        .map(|e| {
            assert_eq!(e.kind, EventKind::SceneColor);
            assert_eq!(e.duration_seconds, 0.0);
            e.color_value.unwrap().to_hex()
        })
        .collect();
    assert_eq!(colors, vec!["#1B4D2E", "#FC6255", "#111111"]);
    assert_eq!(Color::from_hex(&colors[2]), Some(flatland_core::palette::default_background()));
}

/// Speakers that are neither actor get the wide shot.
#[test]
fn unknown_speaker_gets_wide_focus() {
    let timeline = build("NARRATOR: Meanwhile...", UnknownCuePolicy::Drop);
    assert_eq!(timeline.kinds(), vec![EventKind::FocusWide, EventKind::PlayLine]);
    assert_eq!(timeline.events[0].camera_target, Some(ActorRef::Both));
    assert_eq!(timeline.events[1].camera_target, Some(ActorRef::Both));
}

/// Known tags without a resolved asset still wait their fixed duration.
#[test]
fn sfx_without_asset_is_a_timed_wait() {
    let timeline = build("[SILENCE]\n[CLAP]", UnknownCuePolicy::Drop);
    assert_eq!(timeline.kinds(), vec![EventKind::PlaySfx, EventKind::PlaySfx]);
    assert_eq!(timeline.events[0].duration_seconds, 2.0);
    assert_eq!(timeline.events[1].duration_seconds, 5.0);
    assert!(timeline.events.iter().all(|e| e.audio_ref.is_none()));
}

/// Voice assets are looked up by directive index.
#[test]
fn voice_assets_attach_by_directive_index() {
    let directives = parse_script("[SCENE: OCEAN]\nBARRY: Hi.\nCARL: Yo.");
    let cast = ActorProfileRegistry::default();
    let dir = tempfile::tempdir().unwrap();

    // Only CARL's line (index 2) has audio.
    let mut synth = OneLineSynth(dir.path().join("line_2.wav"));
    let voices = flatland_core::build_voice_cache(&directives, &cast, &mut synth, dir.path()).unwrap();

    let timeline = TimelineBuilder::new(&cast, &SfxLibrary::default(), &voices).build(&directives);
    assert_eq!(timeline.events[2].audio_ref, None);
    assert_eq!(
        timeline.events[4].audio_ref,
        Some(AudioRef::Voice(VoiceAsset {
            line_index: 2,
            path: dir.path().join("line_2.wav"),
        }))
    );
}

/// Writes audio for exactly one path when flushed.
struct OneLineSynth(PathBuf);

impl flatland_tts::SpeechSynthesizer for OneLineSynth {
    fn select_voice(&mut self, _identity: flatland_tts::VoiceIdentity) {}

    fn render_to_file(&mut self, _text: &str, _output: &std::path::Path) -> flatland_tts::TtsResult<()> {
        Ok(())
    }

    fn flush(&mut self) -> flatland_tts::TtsResult<flatland_tts::FlushReport> {
        std::fs::write(&self.0, b"RIFF")?;
        Ok(flatland_tts::FlushReport {
            rendered: 1,
            ..Default::default()
        })
    }
}
