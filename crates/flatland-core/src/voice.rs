//! # Voice Cache
//!
//! Pre-renders one audio file per dialogue line before playback starts.
//!
//! Lines are keyed by their position in the directive sequence and written to
//! `line_<index>.wav` inside the run's audio directory. A line whose synthesis
//! fails simply has no asset; playback shows it without sound.

use crate::cast::ActorProfileRegistry;
use crate::errors::VoiceError;
use crate::parser::Directive;
use flatland_tts::SpeechSynthesizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAsset {
    pub line_index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCache {
    assets: BTreeMap<usize, VoiceAsset>,
    /// Dialogue lines that were requested but produced no file.
    missing: Vec<usize>,
}

impl VoiceCache {
    pub fn get(&self, line_index: usize) -> Option<&VoiceAsset> {
        self.assets.get(&line_index)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceAsset> {
        self.assets.values()
    }
}

pub fn line_audio_path(audio_dir: &Path, line_index: usize) -> PathBuf {
    audio_dir.join(format!("line_{}.wav", line_index))
}

/// Requests synthesis for every dialogue line, then flushes once.
///
/// Per-line failures are logged and skipped. A failing flush, or an audio
/// directory that cannot be created, is fatal.
#[instrument(level = "info", skip(directives, cast, synth), fields(lines = directives.len()))]
pub fn build_voice_cache(
    directives: &[Directive],
    cast: &ActorProfileRegistry,
    synth: &mut dyn SpeechSynthesizer,
    audio_dir: &Path,
) -> Result<VoiceCache, VoiceError> {
    std::fs::create_dir_all(audio_dir).map_err(|source| VoiceError::AudioDir {
        path: audio_dir.to_path_buf(),
        source,
    })?;

    let mut requested = BTreeSet::new();
    for (index, directive) in directives.iter().enumerate() {
        let Directive::Dialogue { speaker, text } = directive else {
            continue;
        };

        let path = line_audio_path(audio_dir, index);
        // Never let a stale file from another run stand in for this line.
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| VoiceError::AudioDir {
                path: path.clone(),
                source,
            })?;
        }

        synth.select_voice(cast.voice_for(speaker));
        match synth.render_to_file(text, &path) {
            Ok(()) => {
                requested.insert(index);
            }
            Err(e) => warn!(directive = index, speaker = %speaker, "Voice line skipped: {}", e),
        }
    }

    let report = synth.flush()?;

    let mut cache = VoiceCache::default();
    for (index, directive) in directives.iter().enumerate() {
        if !directive.is_dialogue() {
            continue;
        }
        let path = line_audio_path(audio_dir, index);
        let usable = requested.contains(&index)
            && std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if usable {
            cache.assets.insert(index, VoiceAsset { line_index: index, path });
        } else {
            cache.missing.push(index);
        }
    }

    info!(
        rendered = cache.len(),
        missing = cache.missing.len(),
        failed_in_flush = report.failed.len(),
        "Voice cache ready"
    );
    Ok(cache)
}
