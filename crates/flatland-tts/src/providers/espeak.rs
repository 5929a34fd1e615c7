//! Local eSpeak NG engine, driven as a subprocess.

use crate::{TtsError, TtsProvider, TtsRequest, TtsResult};
use std::io::ErrorKind;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Words per minute used when the request carries no `rate` option.
pub const DEFAULT_RATE: u64 = 165;

pub struct EspeakProvider {
    program: String,
}

impl EspeakProvider {
    pub fn new() -> Self {
        Self::with_program("espeak-ng")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for EspeakProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsProvider for EspeakProvider {
    fn name(&self) -> &'static str {
        "espeak"
    }

    fn synthesize(&self, request: TtsRequest) -> TtsResult<Vec<u8>> {
        let rate = request.options.get("rate")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_RATE);
        let rate = (rate as f32 * request.speed).round().max(80.0) as u64;

        let out = NamedTempFile::new()?;
        debug!(program = %self.program, voice = %request.voice, rate, "Running local speech engine");

        let output = Command::new(&self.program)
            .arg("-v")
            .arg(&request.voice)
            .arg("-s")
            .arg(rate.to_string())
            .arg("-w")
            .arg(out.path())
            .arg("--")
            .arg(&request.text)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    TtsError::ConfigError(format!("'{}' is not installed or not on PATH", self.program))
                }
                _ => TtsError::Io(e),
            })?;

        if !output.status.success() {
            return Err(TtsError::ProviderError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(std::fs::read(out.path())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_a_config_error() {
        let provider = EspeakProvider::with_program("flatland-no-such-speech-engine");
        let err = provider
            .synthesize(TtsRequest {
                text: "Hello".to_string(),
                voice: "en".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TtsError::ConfigError(_)));
    }
}
