//! # Config Module
//!
//! Studio settings: a JSON file with every field defaulted, then environment
//! overrides, then whatever the caller (usually the CLI) sets explicitly.
//!
//! ## Environment
//! - `FLATLAND_AUDIO_DIR`: root for per-run voice audio.
//! - `FLATLAND_SFX_DIR`: sound-effect cache directory.
//! - `FLATLAND_PRIMARY_ACTOR` / `FLATLAND_SECONDARY_ACTOR`: cast names.

use anyhow::{Context, Result};
use flatland_core::cast::{DEFAULT_PRIMARY_ACTOR, DEFAULT_SECONDARY_ACTOR};
use flatland_core::sfx::{default_sources, DEFAULT_MIN_VIABLE_BYTES, DEFAULT_USER_AGENT};
use flatland_core::{Downloader, HttpDownloader, OfflineDownloader, SfxSettings, SfxTag, UnknownCuePolicy};
use flatland_tts::{create_provider, BatchSynthesizer, ProviderType, SilentSynthesizer, SpeechSynthesizer, VoiceMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_AUDIO_DIR: &str = "FLATLAND_AUDIO_DIR";
pub const ENV_SFX_DIR: &str = "FLATLAND_SFX_DIR";
pub const ENV_PRIMARY_ACTOR: &str = "FLATLAND_PRIMARY_ACTOR";
pub const ENV_SECONDARY_ACTOR: &str = "FLATLAND_SECONDARY_ACTOR";

/// Speech engine settings. No provider means a silent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub provider: Option<ProviderType>,
    /// Environment variable holding the API key. Defaults per provider.
    pub api_key_env: Option<String>,
    pub primary_voice: Option<String>,
    pub secondary_voice: Option<String>,
    pub speed: f32,
    /// Words per minute for the local engine.
    pub rate: u32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            provider: None,
            api_key_env: None,
            primary_voice: None,
            secondary_voice: None,
            speed: 1.0,
            rate: 165,
        }
    }
}

impl VoiceSettings {
    /// Environment variable consulted for `provider`'s API key.
    pub fn api_key_var(&self, provider: ProviderType) -> Option<String> {
        let default = match provider {
            ProviderType::OpenAI => "OPENAI_API_KEY",
            ProviderType::ElevenLabs => "ELEVENLABS_API_KEY",
            ProviderType::Gemini => "GEMINI_API_KEY",
            ProviderType::Espeak => return None,
        };
        Some(self.api_key_env.clone().unwrap_or_else(|| default.to_string()))
    }

    /// The provider's stock voices with any configured names swapped in.
    pub fn voices(&self, provider: ProviderType) -> VoiceMap {
        let defaults = provider.default_voices();
        VoiceMap::new(
            self.primary_voice.clone().unwrap_or(defaults.primary),
            self.secondary_voice.clone().unwrap_or(defaults.secondary),
        )
    }

    /// Builds the synthesizer for this run.
    pub fn build_synthesizer(&self) -> Result<Box<dyn SpeechSynthesizer>> {
        let Some(provider) = self.provider else {
            info!("No voice provider configured, dialogue will play without audio");
            return Ok(Box::new(SilentSynthesizer::new()));
        };

        let api_key = self.api_key_var(provider).and_then(|var| std::env::var(var).ok());
        let engine = create_provider(provider, api_key).with_context(|| {
            match self.api_key_var(provider) {
                Some(var) => format!("Cannot start the {} voice provider (key read from ${})", provider.name(), var),
                None => format!("Cannot start the {} voice provider", provider.name()),
            }
        })?;

        info!(provider = provider.name(), "Voice provider ready");
        Ok(Box::new(
            BatchSynthesizer::new(engine, self.voices(provider))
                .with_speed(self.speed)
                .with_options(serde_json::json!({ "rate": self.rate })),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub primary_actor: String,
    pub secondary_actor: String,
    /// Root for voice audio; every run gets its own subdirectory.
    pub audio_root: PathBuf,
    pub sfx_cache_dir: PathBuf,
    /// Cached or downloaded SFX files at or below this size are discarded.
    pub min_sfx_bytes: u64,
    pub sfx_sources: BTreeMap<SfxTag, String>,
    pub user_agent: String,
    pub unknown_cue_policy: UnknownCuePolicy,
    /// Keep the run's voice audio after playback.
    pub keep_audio: bool,
    pub voice: VoiceSettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            primary_actor: DEFAULT_PRIMARY_ACTOR.to_string(),
            secondary_actor: DEFAULT_SECONDARY_ACTOR.to_string(),
            audio_root: PathBuf::from("temp_audio"),
            sfx_cache_dir: PathBuf::from("sfx"),
            min_sfx_bytes: DEFAULT_MIN_VIABLE_BYTES,
            sfx_sources: default_sources(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            unknown_cue_policy: UnknownCuePolicy::default(),
            keep_audio: true,
            voice: VoiceSettings::default(),
        }
    }
}

impl StudioConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))
    }

    /// Defaults, then `path` if given, then the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `FLATLAND_*` overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_AUDIO_DIR) {
            self.audio_root = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_SFX_DIR) {
            self.sfx_cache_dir = PathBuf::from(dir);
        }
        if let Some(name) = get(ENV_PRIMARY_ACTOR) {
            self.primary_actor = name;
        }
        if let Some(name) = get(ENV_SECONDARY_ACTOR) {
            self.secondary_actor = name;
        }
    }

    pub fn sfx_settings(&self) -> SfxSettings {
        SfxSettings {
            cache_dir: self.sfx_cache_dir.clone(),
            min_viable_bytes: self.min_sfx_bytes,
            sources: self.sfx_sources.clone(),
        }
    }

    /// HTTP downloader with the configured user agent, or an offline stub.
    pub fn downloader(&self, offline: bool) -> Result<Box<dyn Downloader>> {
        if offline {
            return Ok(Box::new(OfflineDownloader));
        }
        match HttpDownloader::new(&self.user_agent) {
            Ok(http) => Ok(Box::new(http)),
            Err(e) => {
                warn!("HTTP client unavailable, sound effects will not be downloaded: {}", e);
                Ok(Box::new(OfflineDownloader))
            }
        }
    }
}
