//! # Synthesizers
//!
//! Implementations of [`SpeechSynthesizer`].
//!
//! ## Key Types
//! - `BatchSynthesizer`: queues requests and renders them through a
//!   [`TtsProvider`] when flushed.
//! - `SilentSynthesizer`: accepts requests and renders nothing, used when no
//!   voice engine is available.

use crate::providers::VoiceMap;
use crate::{SpeechSynthesizer, TtsError, TtsProvider, TtsRequest, TtsResult, VoiceIdentity};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Outcome of a [`SpeechSynthesizer::flush`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Number of files written.
    pub rendered: usize,
    /// Output paths whose synthesis failed.
    pub failed: Vec<PathBuf>,
    /// Requests accepted but deliberately not rendered.
    pub skipped: usize,
}

struct PendingRender {
    request: TtsRequest,
    output: PathBuf,
}

/// Queues render requests and commits them all on `flush`.
pub struct BatchSynthesizer {
    provider: Box<dyn TtsProvider>,
    voices: VoiceMap,
    speed: f32,
    options: serde_json::Value,
    current: VoiceIdentity,
    pending: Vec<PendingRender>,
}

impl BatchSynthesizer {
    pub fn new(provider: Box<dyn TtsProvider>, voices: VoiceMap) -> Self {
        Self {
            provider,
            voices,
            speed: 1.0,
            options: serde_json::json!({}),
            current: VoiceIdentity::Primary,
            pending: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Provider-specific options forwarded with every request.
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    /// Number of requests waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl SpeechSynthesizer for BatchSynthesizer {
    fn select_voice(&mut self, identity: VoiceIdentity) {
        self.current = identity;
    }

    fn render_to_file(&mut self, text: &str, output: &Path) -> TtsResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }

        self.pending.push(PendingRender {
            request: TtsRequest {
                text: text.to_string(),
                voice: self.voices.voice(self.current).to_string(),
                speed: self.speed,
                options: self.options.clone(),
            },
            output: output.to_path_buf(),
        });
        Ok(())
    }

    fn flush(&mut self) -> TtsResult<FlushReport> {
        let pending = std::mem::take(&mut self.pending);
        let mut report = FlushReport::default();

        for job in pending {
            let result = self
                .provider
                .synthesize(job.request)
                .and_then(|bytes| write_audio(&job.output, &bytes));

            match result {
                Ok(()) => {
                    debug!(path = ?job.output, "Rendered voice line");
                    report.rendered += 1;
                }
                Err(e) => {
                    warn!(path = ?job.output, provider = self.provider.name(), "Synthesis failed: {}", e);
                    report.failed.push(job.output);
                }
            }
        }

        info!(
            provider = self.provider.name(),
            rendered = report.rendered,
            failed = report.failed.len(),
            "Voice batch flushed"
        );
        Ok(report)
    }
}

/// Accepts every request and writes nothing.
#[derive(Debug, Default)]
pub struct SilentSynthesizer {
    requested: usize,
}

impl SilentSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechSynthesizer for SilentSynthesizer {
    fn select_voice(&mut self, _identity: VoiceIdentity) {}

    fn render_to_file(&mut self, _text: &str, _output: &Path) -> TtsResult<()> {
        self.requested += 1;
        Ok(())
    }

    fn flush(&mut self) -> TtsResult<FlushReport> {
        let skipped = std::mem::take(&mut self.requested);
        if skipped > 0 {
            debug!(skipped, "No voice engine configured, lines will play silently");
        }
        Ok(FlushReport {
            skipped,
            ..Default::default()
        })
    }
}

/// Writes `bytes` to `path` through a temporary file in the same directory.
fn write_audio(path: &Path, bytes: &[u8]) -> TtsResult<()> {
    if bytes.is_empty() {
        return Err(TtsError::ProviderError("provider returned no audio".to_string()));
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
