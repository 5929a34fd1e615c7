pub mod elevenlabs;
pub mod espeak;
pub mod gemini;
pub mod openai;

use crate::{TtsError, TtsProvider, TtsResult, VoiceIdentity};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    ElevenLabs,
    Gemini,
    /// Local eSpeak NG binary, no network or key needed.
    Espeak,
}

impl ProviderType {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::ElevenLabs => "elevenlabs",
            ProviderType::Gemini => "gemini",
            ProviderType::Espeak => "espeak",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        !matches!(self, ProviderType::Espeak)
    }

    /// Two contrasting stock voices for the provider.
    pub fn default_voices(&self) -> VoiceMap {
        match self {
            ProviderType::OpenAI => VoiceMap::new("onyx", "echo"),
            // Stock "Adam" and "Josh" voice ids.
            ProviderType::ElevenLabs => {
                VoiceMap::new("pNInz6obpgDQGcFmaJgB", "TxGEqnHWrfWFTfGW9XjX")
            }
            ProviderType::Gemini => VoiceMap::new("Charon", "Puck"),
            ProviderType::Espeak => VoiceMap::new("en+m3", "en+m7"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "elevenlabs" => Ok(ProviderType::ElevenLabs),
            "gemini" => Ok(ProviderType::Gemini),
            "espeak" | "espeak-ng" => Ok(ProviderType::Espeak),
            other => Err(TtsError::ConfigError(format!("unknown TTS provider '{}'", other))),
        }
    }
}

/// Provider voice names for the two cast voices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceMap {
    pub primary: String,
    pub secondary: String,
}

impl VoiceMap {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    pub fn voice(&self, identity: VoiceIdentity) -> &str {
        match identity {
            VoiceIdentity::Primary => &self.primary,
            VoiceIdentity::Secondary => &self.secondary,
        }
    }
}

pub fn create_provider(
    provider_type: ProviderType,
    api_key: Option<String>,
) -> TtsResult<Box<dyn TtsProvider>> {
    if provider_type == ProviderType::Espeak {
        return Ok(Box::new(espeak::EspeakProvider::new()));
    }

    let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        TtsError::ConfigError(format!("{} requires an API key", provider_type.name()))
    })?;

    Ok(match provider_type {
        ProviderType::OpenAI => Box::new(openai::OpenAIProvider::new(api_key)),
        ProviderType::ElevenLabs => Box::new(elevenlabs::ElevenLabsProvider::new(api_key)),
        ProviderType::Gemini => Box::new(gemini::GeminiProvider::new(api_key)),
        ProviderType::Espeak => Box::new(espeak::EspeakProvider::new()),
    })
}

/// Wraps raw 16-bit little-endian mono PCM in a WAV container.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> TtsResult<Vec<u8>> {
    if pcm.len() < 2 {
        return Err(TtsError::ProviderError("provider returned no audio".to_string()));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for frame in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
                .map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    Ok(cursor.into_inner())
}

fn wav_error(e: hound::Error) -> TtsError {
    TtsError::ProviderError(format!("Failed to encode WAV: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_is_wrapped_as_wav() {
        let samples: [i16; 4] = [0, 1000, -1000, i16::MAX];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm, 24_000).unwrap();
        assert_eq!(&wav[..4], b"RIFF");

        let mut reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_provider_names_parse() {
        assert_eq!("OpenAI".parse::<ProviderType>().unwrap(), ProviderType::OpenAI);
        assert_eq!("espeak-ng".parse::<ProviderType>().unwrap(), ProviderType::Espeak);
        assert!("pyttsx3".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_hosted_providers_need_a_key() {
        let err = create_provider(ProviderType::OpenAI, None).err().unwrap();
        assert!(matches!(err, TtsError::ConfigError(_)));

        let err = create_provider(ProviderType::Gemini, Some("  ".into())).err().unwrap();
        assert!(matches!(err, TtsError::ConfigError(_)));

        let provider = create_provider(ProviderType::Espeak, None).unwrap();
        assert_eq!(provider.name(), "espeak");
    }

    #[test]
    fn test_voice_map_selects_by_identity() {
        let voices = ProviderType::OpenAI.default_voices();
        assert_eq!(voices.voice(VoiceIdentity::Primary), "onyx");
        assert_eq!(voices.voice(VoiceIdentity::Secondary), "echo");
    }

    #[test]
    fn test_provider_type_config_spelling() {
        let parsed: ProviderType = serde_json::from_str("\"elevenlabs\"").unwrap();
        assert_eq!(parsed, ProviderType::ElevenLabs);
        assert_eq!(serde_json::to_string(&ProviderType::OpenAI).unwrap(), "\"openai\"");
    }
}
