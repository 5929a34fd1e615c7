use serde_json::{json, Value};
use crate::{TtsProvider, TtsRequest, TtsResult, TtsError};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const DEFAULT_MODEL: &str = "tts-1";

/// The speech endpoint rejects speeds outside this range.
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;

pub struct OpenAIProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

/// Builds the JSON body for one speech request. Lines are stored as
/// `line_<n>.wav`, so WAV output is always requested.
fn speech_request(request: &TtsRequest) -> Value {
    let model = request.options.get("model")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_MODEL);

    json!({
        "model": model,
        "input": request.text,
        "voice": request.voice,
        "speed": request.speed.clamp(MIN_SPEED, MAX_SPEED),
        "response_format": "wav",
    })
}

impl TtsProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn synthesize(&self, request: TtsRequest) -> TtsResult<Vec<u8>> {
        let response = self.client
            .post(SPEECH_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&speech_request(&request))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text()?;
            return Err(TtsError::ProviderError(format!("OpenAI API error ({}): {}", status, error_text)));
        }

        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }
}
