use serde_json::json;
use super::pcm_to_wav;
use crate::{TtsProvider, TtsRequest, TtsResult, TtsError};
use base64::{Engine as _, engine::general_purpose};

/// Gemini speech output is 16-bit mono PCM at 24 kHz.
const SAMPLE_RATE: u32 = 24_000;

pub struct GeminiProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl TtsProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn synthesize(&self, request: TtsRequest) -> TtsResult<Vec<u8>> {
        let model = request.options.get("model")
            .and_then(|v| v.as_str())
            .unwrap_or("gemini-2.5-flash-preview-tts");

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": request.text }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": request.voice }
                    }
                }
            }
        });

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let error_text = response.text()?;
            return Err(TtsError::ProviderError(format!("Gemini API error: {}", error_text)));
        }

        let response_json: serde_json::Value = response.json()?;
        let pcm = decode_inline_audio(&response_json)?;
        pcm_to_wav(&pcm, SAMPLE_RATE)
    }
}

/// Pulls `candidates[0].content.parts[0].inlineData.data` out of a response.
fn decode_inline_audio(response: &serde_json::Value) -> TtsResult<Vec<u8>> {
    let encoded = response
        .pointer("/candidates/0/content/parts/0/inlineData/data")
        .and_then(|v| v.as_str())
        .ok_or_else(|| TtsError::ProviderError("No audio data found in Gemini response".to_string()))?;

    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| TtsError::ProviderError(format!("Failed to decode base64 audio: {}", e)))
}
