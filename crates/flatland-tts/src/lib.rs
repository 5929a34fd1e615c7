use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub mod providers;
pub mod synth;

pub use providers::{create_provider, ProviderType, VoiceMap};
pub use synth::{BatchSynthesizer, FlushReport, SilentSynthesizer};

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Nothing to synthesize")]
    EmptyText,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type TtsResult<T> = Result<T, TtsError>;

#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub voice: String,
    pub speed: f32,
    /// Provider-specific configuration (e.g., model ID)
    pub options: serde_json::Value,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            voice: String::new(),
            speed: 1.0,
            options: serde_json::json!({}),
        }
    }
}

pub trait TtsProvider: Send + Sync {
    /// Synthesizes text to speech and returns the audio bytes (usually MP3 or WAV).
    fn synthesize(&self, request: TtsRequest) -> TtsResult<Vec<u8>>;

    /// Returns the provider name (e.g., "openai", "elevenlabs").
    fn name(&self) -> &'static str;
}

/// Which of the two cast voices a line is spoken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceIdentity {
    #[default]
    Primary,
    Secondary,
}

/// The speech-synthesis collaborator as seen by the rest of the studio.
///
/// Implementations may defer the actual work: `render_to_file` only has to
/// guarantee that the file exists once `flush` has returned.
pub trait SpeechSynthesizer {
    /// Selects the voice used by subsequent `render_to_file` calls.
    fn select_voice(&mut self, identity: VoiceIdentity);

    /// Requests that `text` be rendered to an audio file at `output`.
    fn render_to_file(&mut self, text: &str, output: &Path) -> TtsResult<()>;

    /// Commits every pending request.
    fn flush(&mut self) -> TtsResult<FlushReport>;
}
