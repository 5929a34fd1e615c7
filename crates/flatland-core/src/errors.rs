use flatland_tts::TtsError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by the rendering collaborator.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer rejected action: {0}")]
    Backend(String),
    #[error("Playback already finished")]
    AlreadyFinished,
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure that prevents sound-effect resolution from running at all.
///
/// Individual download or synthesis failures are not errors; they degrade the
/// tag to a silent wait.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Cannot prepare sound-effect cache {path:?}: {source}")]
    CacheDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Cannot prepare audio directory {path:?}: {source}")]
    AudioDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] TtsError),
}

/// Failure of a single download attempt.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Download request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Downloaded file is too small to be audio ({bytes} bytes)")]
    TooSmall { bytes: usize },
    #[error("Network access is disabled")]
    Offline,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
