//! # Directive Parser
//!
//! Turns raw script text into typed [`Directive`]s in one forward pass.
//!
//! ## Grammar (keywords are case-insensitive)
//! - `SPEAKER: free text` → [`Directive::Dialogue`]
//! - `[SCENE: NAME]` → [`Directive::SceneChange`]
//! - `[CONFIG: NAME, SHAPE, COLOR]` → [`Directive::ActorConfig`] (exactly three fields)
//! - `[ANYTHING ELSE]` → [`Directive::SoundEffect`], tag kept verbatim
//!
//! Blank lines, lines with neither brackets nor a colon, and malformed
//! `CONFIG` cues are dropped without error.
//!
//! Parsing happens in two steps so the flat [`ScriptDocument`] can be
//! persisted between them: [`split_script`] produces records, [`classify`]
//! turns a record into a directive.

use flatland_schema::{is_bracketed, ScriptDocument, ScriptLine};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const SCENE_PREFIX: &str = "SCENE:";
const CONFIG_PREFIX: &str = "CONFIG:";

/// A parsed, typed unit derived from one script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Dialogue {
        speaker: String,
        text: String,
    },
    SoundEffect {
        tag: String,
    },
    SceneChange {
        name: String,
    },
    ActorConfig {
        actor_name: String,
        shape: String,
        color: String,
    },
}

impl Directive {
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Directive::Dialogue { .. })
    }

    /// Rebuilds the flat record this directive would be parsed from.
    pub fn to_script_line(&self) -> ScriptLine {
        match self {
            Directive::Dialogue { speaker, text } => ScriptLine::new(speaker.clone(), text.clone()),
            cue => ScriptLine::cue(cue.to_string()),
        }
    }
}

impl fmt::Display for Directive {
    /// Formats the directive back into script syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Dialogue { speaker, text } => write!(f, "{}: {}", speaker, text),
            Directive::SoundEffect { tag } => write!(f, "[{}]", tag),
            Directive::SceneChange { name } => write!(f, "[SCENE: {}]", name),
            Directive::ActorConfig {
                actor_name,
                shape,
                color,
            } => write!(f, "[CONFIG: {}, {}, {}]", actor_name, shape, color),
        }
    }
}

/// Splits raw script text into flat `{speaker, text}` records.
pub fn split_script(text: &str) -> ScriptDocument {
    let mut lines = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if is_bracketed(line) {
            lines.push(ScriptLine::cue(line));
        } else if let Some((speaker, said)) = line.split_once(':') {
            lines.push(ScriptLine::new(speaker.trim(), said.trim()));
        } else {
            debug!(line = number + 1, "Dropping line with no speaker or cue");
        }
    }

    ScriptDocument::new(lines)
}

/// Classifies one record. Returns `None` for records that are dropped.
pub fn classify(line: &ScriptLine) -> Option<Directive> {
    match line.cue_body() {
        Some(body) => parse_cue(body),
        None => Some(Directive::Dialogue {
            speaker: line.speaker.trim().to_string(),
            text: line.text.trim().to_string(),
        }),
    }
}

/// Classifies the contents of a bracketed cue (brackets already removed).
pub fn parse_cue(body: &str) -> Option<Directive> {
    let body = body.trim();

    if let Some(name) = strip_prefix_ignore_case(body, SCENE_PREFIX) {
        return Some(Directive::SceneChange {
            name: name.trim().to_uppercase(),
        });
    }

    if let Some(fields) = strip_prefix_ignore_case(body, CONFIG_PREFIX) {
        let fields: Vec<String> = fields.split(',').map(|f| f.trim().to_uppercase()).collect();
        return match <[String; 3]>::try_from(fields) {
            Ok([actor_name, shape, color]) => Some(Directive::ActorConfig {
                actor_name,
                shape,
                color,
            }),
            Err(fields) => {
                debug!(fields = fields.len(), "Ignoring CONFIG cue without exactly three fields");
                None
            }
        };
    }

    Some(Directive::SoundEffect {
        tag: body.to_string(),
    })
}

pub fn parse_document(document: &ScriptDocument) -> Vec<Directive> {
    document.lines.iter().filter_map(classify).collect()
}

/// Parses raw script text into the ordered directive sequence.
pub fn parse_script(text: &str) -> Vec<Directive> {
    parse_document(&split_script(text))
}

/// Reconstructs script text from directives, one per line.
pub fn render_script(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_document(directives: &[Directive]) -> ScriptDocument {
    directives.iter().map(Directive::to_script_line).collect::<Vec<_>>().into()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue(speaker: &str, text: &str) -> Directive {
        Directive::Dialogue {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_dialogue_splits_on_first_colon() {
        let parsed = parse_script("BARRY:  It's 5:30 already ");
        assert_eq!(parsed, vec![dialogue("BARRY", "It's 5:30 already")]);
    }

    #[test]
    fn test_blank_and_unstructured_lines_are_dropped() {
        let parsed = parse_script("\n   \nno colon here\nCARL: Yo.\n");
        assert_eq!(parsed, vec![dialogue("CARL", "Yo.")]);
    }

    #[test]
    fn test_cue_keywords_are_case_insensitive() {
        let parsed = parse_script("[scene: forest]\n[Config: carl, triangle, green]");
        assert_eq!(
            parsed,
            vec![
                Directive::SceneChange {
                    name: "FOREST".to_string()
                },
                Directive::ActorConfig {
                    actor_name: "CARL".to_string(),
                    shape: "TRIANGLE".to_string(),
                    color: "GREEN".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_config_needs_exactly_three_fields() {
        assert!(parse_script("[CONFIG: CARL, TRIANGLE]").is_empty());
        assert!(parse_script("[CONFIG: CARL, TRIANGLE, GREEN, LOUD]").is_empty());
    }

    #[test]
    fn test_unknown_bracket_is_kept_as_sound_effect() {
        let parsed = parse_script("[ FooBar ]");
        assert_eq!(
            parsed,
            vec![Directive::SoundEffect {
                tag: "FooBar".to_string()
            }]
        );
    }

    #[test]
    fn test_bracketed_text_after_speaker_is_dialogue() {
        let parsed = parse_script("BARRY: [LAUGH]");
        assert_eq!(parsed, vec![dialogue("BARRY", "[LAUGH]")]);

        let doc = split_script("SFX: [LAUGH]");
        assert!(!doc.lines[0].is_cue());
        assert_eq!(classify(&doc.lines[0]), Some(dialogue("SFX", "[LAUGH]")));
    }

    #[test]
    fn test_cue_records_use_reserved_speaker() {
        let doc = split_script("[LAUGH]\nBARRY: Hi.");
        assert_eq!(doc.lines[0], ScriptLine::cue("[LAUGH]"));
        assert_eq!(doc.lines[1], ScriptLine::new("BARRY", "Hi."));
    }

    #[test]
    fn test_display_matches_script_syntax() {
        let directives = parse_script("BARRY: Hi.\n[SCENE: OCEAN]\n[CONFIG: BARRY, STAR, GOLD]\n[BOO]");
        assert_eq!(
            render_script(&directives),
            "BARRY: Hi.\n[SCENE: OCEAN]\n[CONFIG: BARRY, STAR, GOLD]\n[BOO]"
        );
    }

    #[test]
    fn test_non_ascii_prefix_does_not_panic() {
        let parsed = parse_script("[ÉCLAT]");
        assert_eq!(
            parsed,
            vec![Directive::SoundEffect {
                tag: "ÉCLAT".to_string()
            }]
        );
    }
}
