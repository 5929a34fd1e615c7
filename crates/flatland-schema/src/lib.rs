//! # Script Schema
//!
//! The flat record format handed from the parse phase to any out-of-process
//! render phase. A script is an ordered list of `{speaker, text}` records;
//! bracketed cue lines are stored with the reserved speaker [`CUE_SPEAKER`]
//! and `"kind": "cue"`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Speaker recorded for bracketed cue lines (`[LAUGH]`, `[SCENE: FOREST]`, ...).
pub const CUE_SPEAKER: &str = "SFX";

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid script document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether a record came from a bracketed cue line or a `SPEAKER: text` line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Dialogue,
    Cue,
}

impl LineKind {
    pub fn is_dialogue(&self) -> bool {
        matches!(self, LineKind::Dialogue)
    }
}

/// One logical line of the input script. Order is significant.
///
/// Dialogue records serialize as plain `{speaker, text}`; cue records also
/// carry `"kind": "cue"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub speaker: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "LineKind::is_dialogue")]
    pub kind: LineKind,
}

impl ScriptLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            kind: LineKind::Dialogue,
        }
    }

    /// Builds a cue record from a full bracketed line such as `[LAUGH]`.
    pub fn cue(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Cue,
            ..Self::new(CUE_SPEAKER, text)
        }
    }

    /// True when this record is a bracketed cue rather than dialogue.
    ///
    /// Decided by the record kind, never by the speaker name: a character
    /// called `SFX` still speaks dialogue.
    pub fn is_cue(&self) -> bool {
        self.kind == LineKind::Cue && is_bracketed(self.text.trim())
    }

    /// The text between the brackets of a cue record.
    pub fn cue_body(&self) -> Option<&str> {
        if !self.is_cue() {
            return None;
        }
        let text = self.text.trim();
        Some(text[1..text.len() - 1].trim())
    }
}

/// Returns true when `text` starts with `[` and ends with `]`.
pub fn is_bracketed(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('[') && text.ends_with(']')
}

/// The persisted hand-off artifact: a flat, ordered list of script lines.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ScriptDocument {
    pub lines: Vec<ScriptLine>,
}

impl ScriptDocument {
    pub fn new(lines: Vec<ScriptLine>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a document previously written with [`ScriptDocument::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl From<Vec<ScriptLine>> for ScriptDocument {
    fn from(lines: Vec<ScriptLine>) -> Self {
        Self::new(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_is_a_flat_list() {
        let doc = ScriptDocument::new(vec![
            ScriptLine::new("BARRY", "Hi."),
            ScriptLine::cue("[LAUGH]"),
        ]);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"speaker": "BARRY", "text": "Hi."},
                {"speaker": "SFX", "text": "[LAUGH]", "kind": "cue"}
            ])
        );
    }

    #[test]
    fn test_document_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp_script.json");

        let doc = ScriptDocument::new(vec![
            ScriptLine::new("CARL", "Yo."),
            ScriptLine::cue("[SCENE: FOREST]"),
        ]);
        doc.save(&path).unwrap();

        let loaded = ScriptDocument::load(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_cue_detection() {
        assert!(ScriptLine::cue("[BOO]").is_cue());
        assert_eq!(ScriptLine::cue(" [ BOO ] ").cue_body(), Some("BOO"));
        // A character who happens to be called SFX is still dialogue.
        assert!(!ScriptLine::new("SFX", "hello there").is_cue());
        assert!(!ScriptLine::new("SFX", "[LAUGH]").is_cue());
        assert!(!ScriptLine::new("BARRY", "[LAUGH]").is_cue());
        assert!(!ScriptLine::cue("[").is_cue());
    }

    #[test]
    fn test_kind_defaults_to_dialogue() {
        let doc = ScriptDocument::from_json(r#"[{"speaker": "SFX", "text": "[LAUGH]"}]"#).unwrap();
        assert_eq!(doc.lines[0].kind, LineKind::Dialogue);
        assert!(!doc.lines[0].is_cue());

        let cue = ScriptDocument::from_json(r#"[{"speaker": "SFX", "text": "[LAUGH]", "kind": "cue"}]"#).unwrap();
        assert!(cue.lines[0].is_cue());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = ScriptDocument::from_json("{\"speaker\": 1}").unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }
}
