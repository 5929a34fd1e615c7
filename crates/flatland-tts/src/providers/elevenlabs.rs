use serde_json::json;
use super::pcm_to_wav;
use crate::{TtsProvider, TtsRequest, TtsResult, TtsError};

/// Raw PCM keeps the rendered line a plain WAV like every other provider.
const OUTPUT_FORMAT: &str = "pcm_22050";
const SAMPLE_RATE: u32 = 22_050;

pub struct ElevenLabsProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl ElevenLabsProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl TtsProvider for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn synthesize(&self, request: TtsRequest) -> TtsResult<Vec<u8>> {
        let model_id = request.options.get("model_id")
            .and_then(|v| v.as_str())
            .unwrap_or("eleven_multilingual_v2");

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}?output_format={}",
            request.voice, OUTPUT_FORMAT
        );

        let mut settings = request.options.get("voice_settings")
            .cloned()
            .unwrap_or_else(|| json!({}));
        if let Some(map) = settings.as_object_mut() {
            map.entry("speed").or_insert(json!(request.speed));
        }

        let response = self.client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&json!({
                "text": request.text,
                "model_id": model_id,
                "voice_settings": settings,
            }))
            .send()?;

        if !response.status().is_success() {
            let error_text = response.text()?;
            return Err(TtsError::ProviderError(format!("ElevenLabs API error: {}", error_text)));
        }

        let pcm = response.bytes()?;
        pcm_to_wav(&pcm, SAMPLE_RATE)
    }
}
