//! # Sound Effects
//!
//! Guarantees every known sound-effect tag resolves to something playable.
//!
//! ## Fallback chain (per tag)
//! 1. Reuse the cached file when it is larger than the viability threshold.
//! 2. Download it from the configured source.
//! 3. Synthesize a short spoken placeholder phrase.
//! 4. Give up: the tag has no audio and plays as a silent wait.
//!
//! Durations are fixed per tag and never measured from the audio.

use crate::errors::{AssetError, DownloadError};
use flatland_tts::{SpeechSynthesizer, VoiceIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Browser-like agent; the default sources reject unknown clients with 403.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Cached or downloaded files at or below this size are treated as broken.
pub const DEFAULT_MIN_VIABLE_BYTES: u64 = 1024;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// The fixed set of known sound-effect cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SfxTag {
    Laugh,
    Boo,
    Clap,
    Cricket,
    Silence,
}

impl SfxTag {
    pub const ALL: [SfxTag; 5] = [
        SfxTag::Laugh,
        SfxTag::Boo,
        SfxTag::Clap,
        SfxTag::Cricket,
        SfxTag::Silence,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|t| t.name().eq_ignore_ascii_case(tag))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SfxTag::Laugh => "LAUGH",
            SfxTag::Boo => "BOO",
            SfxTag::Clap => "CLAP",
            SfxTag::Cricket => "CRICKET",
            SfxTag::Silence => "SILENCE",
        }
    }

    /// Nominal length of the cue in seconds.
    pub fn duration_seconds(&self) -> f64 {
        match self {
            SfxTag::Laugh => 4.0,
            SfxTag::Boo => 3.0,
            SfxTag::Clap => 5.0,
            SfxTag::Cricket => 2.0,
            SfxTag::Silence => 2.0,
        }
    }

    /// `SILENCE` is a pure wait and never has audio.
    pub fn is_silent(&self) -> bool {
        matches!(self, SfxTag::Silence)
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            SfxTag::Laugh => "laugh",
            SfxTag::Boo => "boo",
            SfxTag::Clap => "clap",
            SfxTag::Cricket => "cricket",
            SfxTag::Silence => "silence",
        }
    }

    /// Spoken stand-in used when no recording can be obtained.
    pub fn placeholder_phrase(&self) -> Option<&'static str> {
        match self {
            SfxTag::Laugh => Some("Ha ha ha ha ha!"),
            SfxTag::Boo => Some("Boooo!"),
            SfxTag::Clap => Some("Clap clap clap clap!"),
            SfxTag::Cricket => Some("Chirp. Chirp. Chirp."),
            SfxTag::Silence => None,
        }
    }
}

impl fmt::Display for SfxTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Public-domain recordings on Wikimedia Commons.
pub fn default_sources() -> BTreeMap<SfxTag, String> {
    [
        (SfxTag::Laugh, "https://upload.wikimedia.org/wikipedia/commons/transcoded/e/ee/Laugh_track_-_Audience_laughter.ogg/Laugh_track_-_Audience_laughter.ogg.mp3"),
        (SfxTag::Boo, "https://upload.wikimedia.org/wikipedia/commons/transcoded/3/3b/Crowd_Boo.wav/Crowd_Boo.wav.mp3"),
        (SfxTag::Clap, "https://upload.wikimedia.org/wikipedia/commons/transcoded/6/62/Applause_-_enthusiastic.ogg/Applause_-_enthusiastic.ogg.mp3"),
        (SfxTag::Cricket, "https://upload.wikimedia.org/wikipedia/commons/transcoded/e/e9/Crickets_chirping.ogg/Crickets_chirping.ogg.mp3"),
    ]
    .into_iter()
    .map(|(tag, url)| (tag, url.to_string()))
    .collect()
}

/// Where a resolved asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Cache,
    Download,
    Placeholder,
    /// The tag is a wait by definition.
    Silent,
    /// Every strategy failed.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SfxAsset {
    pub tag: SfxTag,
    pub path: Option<PathBuf>,
    pub duration_seconds: f64,
    pub source: AssetSource,
}

impl SfxAsset {
    fn new(tag: SfxTag, path: Option<PathBuf>, source: AssetSource) -> Self {
        Self {
            tag,
            path,
            duration_seconds: tag.duration_seconds(),
            source,
        }
    }
}

/// Fetches raw bytes for a URL.
pub trait Downloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Blocking HTTP downloader.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new(user_agent: &str) -> Result<Self, DownloadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Downloader for runs without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDownloader;

impl Downloader for OfflineDownloader {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
        Err(DownloadError::Offline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfxSettings {
    pub cache_dir: PathBuf,
    pub min_viable_bytes: u64,
    pub sources: BTreeMap<SfxTag, String>,
}

impl SfxSettings {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            min_viable_bytes: DEFAULT_MIN_VIABLE_BYTES,
            sources: default_sources(),
        }
    }

    /// Cache location of a tag's recording, named after the source's extension.
    pub fn cache_path(&self, tag: SfxTag) -> PathBuf {
        let ext = self
            .sources
            .get(&tag)
            .and_then(|url| url_extension(url))
            .unwrap_or("wav");
        self.cache_dir.join(format!("{}.{}", tag.file_stem(), ext))
    }

    pub fn placeholder_path(&self, tag: SfxTag) -> PathBuf {
        self.cache_dir.join(format!("{}_placeholder.wav", tag.file_stem()))
    }

    fn is_viable(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.len() > self.min_viable_bytes)
            .unwrap_or(false)
    }
}

fn url_extension(url: &str) -> Option<&str> {
    let file = url.split(['?', '#']).next()?.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// Resolved assets for the known tags, cached for the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SfxLibrary {
    assets: BTreeMap<SfxTag, SfxAsset>,
}

impl SfxLibrary {
    pub fn insert(&mut self, asset: SfxAsset) {
        self.assets.insert(asset.tag, asset);
    }

    pub fn get(&self, tag: SfxTag) -> Option<&SfxAsset> {
        self.assets.get(&tag)
    }

    /// Looks up a raw cue tag as written in the script.
    pub fn lookup(&self, tag: &str) -> Option<&SfxAsset> {
        SfxTag::parse(tag).and_then(|t| self.get(t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SfxAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Tags for which every acquisition strategy failed.
    pub fn missing(&self) -> impl Iterator<Item = SfxTag> + '_ {
        self.assets
            .values()
            .filter(|a| a.source == AssetSource::Missing)
            .map(|a| a.tag)
    }
}

/// Runs the fallback chain for each known tag.
pub struct SfxResolver<'a> {
    settings: &'a SfxSettings,
    downloader: &'a dyn Downloader,
    synth: &'a mut dyn SpeechSynthesizer,
}

impl<'a> SfxResolver<'a> {
    pub fn new(
        settings: &'a SfxSettings,
        downloader: &'a dyn Downloader,
        synth: &'a mut dyn SpeechSynthesizer,
    ) -> Self {
        Self {
            settings,
            downloader,
            synth,
        }
    }

    /// Resolves every known tag. Only an unusable cache directory is fatal.
    #[instrument(level = "info", skip(self), fields(cache_dir = ?self.settings.cache_dir))]
    pub fn resolve_all(&mut self) -> Result<SfxLibrary, AssetError> {
        std::fs::create_dir_all(&self.settings.cache_dir).map_err(|source| AssetError::CacheDir {
            path: self.settings.cache_dir.clone(),
            source,
        })?;

        let mut library = SfxLibrary::default();
        for tag in SfxTag::ALL {
            library.insert(self.resolve(tag));
        }
        Ok(library)
    }

    pub fn resolve(&mut self, tag: SfxTag) -> SfxAsset {
        if tag.is_silent() {
            return SfxAsset::new(tag, None, AssetSource::Silent);
        }

        let path = self.settings.cache_path(tag);
        if self.settings.is_viable(&path) {
            debug!(%tag, ?path, "Reusing cached sound effect");
            return SfxAsset::new(tag, Some(path), AssetSource::Cache);
        }

        match self.settings.sources.get(&tag) {
            Some(url) => match self.download(url, &path) {
                Ok(()) => {
                    info!(%tag, ?path, "Downloaded sound effect");
                    return SfxAsset::new(tag, Some(path), AssetSource::Download);
                }
                Err(e) => warn!(%tag, url = %url, "Sound effect download failed: {}", e),
            },
            None => debug!(%tag, "No download source configured"),
        }

        if let Some(placeholder) = self.synthesize_placeholder(tag) {
            info!(%tag, path = ?placeholder, "Using spoken placeholder");
            return SfxAsset::new(tag, Some(placeholder), AssetSource::Placeholder);
        }

        warn!(%tag, "No audio for sound effect, it will play as a silent wait");
        SfxAsset::new(tag, None, AssetSource::Missing)
    }

    fn download(&self, url: &str, path: &Path) -> Result<(), DownloadError> {
        let bytes = self.downloader.fetch(url)?;
        if bytes.len() as u64 <= self.settings.min_viable_bytes {
            return Err(DownloadError::TooSmall { bytes: bytes.len() });
        }

        let mut tmp = NamedTempFile::new_in(&self.settings.cache_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn synthesize_placeholder(&mut self, tag: SfxTag) -> Option<PathBuf> {
        let phrase = tag.placeholder_phrase()?;
        let path = self.settings.placeholder_path(tag);
        let _ = std::fs::remove_file(&path);

        self.synth.select_voice(VoiceIdentity::Primary);
        if let Err(e) = self.synth.render_to_file(phrase, &path) {
            warn!(%tag, "Placeholder synthesis rejected: {}", e);
            return None;
        }
        if let Err(e) = self.synth.flush() {
            warn!(%tag, "Placeholder synthesis failed: {}", e);
            return None;
        }

        let written = std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        written.then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_parse_case_insensitively() {
        assert_eq!(SfxTag::parse("laugh"), Some(SfxTag::Laugh));
        assert_eq!(SfxTag::parse(" Cricket "), Some(SfxTag::Cricket));
        assert_eq!(SfxTag::parse("FOOBAR"), None);
    }

    #[test]
    fn test_durations_are_fixed() {
        let durations: Vec<f64> = SfxTag::ALL.iter().map(|t| t.duration_seconds()).collect();
        assert_eq!(durations, vec![4.0, 3.0, 5.0, 2.0, 2.0]);
    }

    #[test]
    fn test_cache_path_follows_source_extension() {
        let settings = SfxSettings::new("sfx");
        assert_eq!(settings.cache_path(SfxTag::Laugh), Path::new("sfx/laugh.mp3"));

        let mut settings = SfxSettings::new("sfx");
        settings.sources.clear();
        assert_eq!(settings.cache_path(SfxTag::Boo), Path::new("sfx/boo.wav"));
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://x.org/a/b.ogg?download=1"), Some("ogg"));
        assert_eq!(url_extension("https://x.org/a/noext"), None);
        assert_eq!(url_extension("https://x.org/a/file.tar.bz2000"), None);
    }

    #[test]
    fn test_default_sources_cover_audible_tags() {
        let sources = default_sources();
        for tag in SfxTag::ALL {
            assert_eq!(sources.contains_key(&tag), !tag.is_silent(), "{}", tag);
        }
    }
}
