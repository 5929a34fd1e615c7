//! # Flatland Pipeline
//!
//! Runs a script through every stage, in order, with an explicit result per
//! phase:
//!
//! ```text
//! parse → cast → sound effects → voices → timeline → playback
//! ```
//!
//! Recoverable problems (a missing sound effect, an unvoiced line, an unknown
//! cue under the `warn` policy) are collected as diagnostics on the
//! [`Production`]. Anything else stops the run with a [`PipelineError`] that
//! names the failing [`Phase`] and carries the diagnostics gathered so far.

pub mod config;

pub use config::{StudioConfig, VoiceSettings};

use flatland_core::sfx::AssetSource;
use flatland_core::{
    build_voice_cache, parse_document, split_script, ActorProfileRegistry, Directive, Downloader,
    PlaybackDriver, PlaybackReport, RenderBackend, SfxLibrary, SfxResolver, Timeline,
    TimelineBuilder, VoiceCache,
};
use flatland_schema::ScriptDocument;
use flatland_tts::SpeechSynthesizer;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Cast,
    SoundEffects,
    Voices,
    Timeline,
    Playback,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Parse => "parse",
            Phase::Cast => "cast",
            Phase::SoundEffects => "sound effects",
            Phase::Voices => "voices",
            Phase::Timeline => "timeline",
            Phase::Playback => "playback",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
#[error("{phase} phase failed: {source}")]
pub struct PipelineError {
    pub phase: Phase,
    /// Diagnostics collected before the failure.
    pub diagnostics: Vec<String>,
    pub source: anyhow::Error,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Production {
    pub directives: Vec<Directive>,
    pub cast: ActorProfileRegistry,
    pub sfx: SfxLibrary,
    pub voices: VoiceCache,
    pub timeline: Timeline,
    pub report: PlaybackReport,
    pub diagnostics: Vec<String>,
    /// The run's voice directory, unless it was cleaned up.
    pub audio_dir: Option<PathBuf>,
}

/// A per-run audio namespace, `<root>/run-<16 hex digits>`.
#[derive(Debug)]
pub struct RunWorkspace {
    path: PathBuf,
}

impl RunWorkspace {
    const ATTEMPTS: usize = 8;

    pub fn create(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let mut last_err = None;
        for _ in 0..Self::ATTEMPTS {
            let path = root.join(format!("run-{:016x}", rand::random::<u64>()));
            match std::fs::create_dir(&path) {
                Ok(()) => {
                    debug!(?path, "Created run workspace");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::other("no free run directory")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the workspace and everything in it.
    pub fn cleanup(self) -> io::Result<()> {
        std::fs::remove_dir_all(&self.path)
    }

    /// Keeps the workspace on disk and returns its path.
    pub fn keep(self) -> PathBuf {
        self.path
    }
}

/// Reads script input: the persisted record list if `input` is one,
/// raw script text otherwise.
pub fn read_script(input: &str) -> ScriptDocument {
    if input.trim_start().starts_with('[') {
        if let Ok(document) = ScriptDocument::from_json(input) {
            debug!(lines = document.len(), "Input is a parsed script document");
            return document;
        }
    }
    split_script(input)
}

/// The production pipeline with its collaborators.
pub struct Studio<'a> {
    config: &'a StudioConfig,
    downloader: &'a dyn Downloader,
    synth: &'a mut dyn SpeechSynthesizer,
}

impl<'a> Studio<'a> {
    pub fn new(
        config: &'a StudioConfig,
        downloader: &'a dyn Downloader,
        synth: &'a mut dyn SpeechSynthesizer,
    ) -> Self {
        Self {
            config,
            downloader,
            synth,
        }
    }

    pub fn produce(&mut self, script: &str, backend: &mut dyn RenderBackend) -> Result<Production, PipelineError> {
        self.produce_document(&read_script(script), backend)
    }

    #[instrument(level = "info", skip_all, fields(lines = document.len()))]
    pub fn produce_document(
        &mut self,
        document: &ScriptDocument,
        backend: &mut dyn RenderBackend,
    ) -> Result<Production, PipelineError> {
        let mut diagnostics = Vec::new();

        // Parse
        let directives = parse_document(document);
        info!(directives = directives.len(), "Script parsed");
        if directives.is_empty() {
            diagnostics.push("script contains no directives".to_string());
        }

        // Cast
        let cast = ActorProfileRegistry::from_directives(
            &self.config.primary_actor,
            &self.config.secondary_actor,
            &directives,
        );
        if cast.primary().name.is_empty() || cast.secondary().name.is_empty() {
            return Err(fail(
                Phase::Cast,
                diagnostics,
                anyhow::anyhow!("both actor names must be non-empty"),
            ));
        }
        if cast.primary().name == cast.secondary().name {
            return Err(fail(
                Phase::Cast,
                diagnostics,
                anyhow::anyhow!("primary and secondary actor are both named {}", cast.primary().name),
            ));
        }

        // Sound effects
        let settings = self.config.sfx_settings();
        let sfx = match SfxResolver::new(&settings, self.downloader, &mut *self.synth).resolve_all() {
            Ok(library) => library,
            Err(e) => return Err(fail(Phase::SoundEffects, diagnostics, e.into())),
        };
        for asset in sfx.iter() {
            match asset.source {
                AssetSource::Placeholder => {
                    diagnostics.push(format!("sound effect {} uses a spoken placeholder", asset.tag))
                }
                AssetSource::Missing => diagnostics.push(format!(
                    "sound effect {} has no audio and plays as a {}s silent wait",
                    asset.tag, asset.duration_seconds
                )),
                _ => {}
            }
        }

        // Voices
        let workspace = match RunWorkspace::create(&self.config.audio_root) {
            Ok(workspace) => workspace,
            Err(e) => {
                let e = anyhow::Error::new(e)
                    .context(format!("Cannot create a run directory under {:?}", self.config.audio_root));
                return Err(fail(Phase::Voices, diagnostics, e));
            }
        };
        let voices = match build_voice_cache(&directives, &cast, &mut *self.synth, workspace.path()) {
            Ok(voices) => voices,
            Err(e) => return Err(fail(Phase::Voices, diagnostics, e.into())),
        };
        for index in voices.missing() {
            diagnostics.push(format!("directive {} has no voice audio and plays silently", index));
        }

        // Timeline
        let timeline = TimelineBuilder::new(&cast, &sfx, &voices)
            .with_policy(self.config.unknown_cue_policy)
            .build(&directives);
        diagnostics.extend(timeline.warnings.iter().cloned());
        info!(
            events = timeline.len(),
            seconds = timeline.total_duration(),
            "Timeline built"
        );

        // Playback
        let report = match PlaybackDriver::new(backend).run(&cast, &timeline) {
            Ok(report) => report,
            Err(e) => return Err(fail(Phase::Playback, diagnostics, e.into())),
        };

        let audio_dir = if self.config.keep_audio {
            Some(workspace.keep())
        } else {
            let path = workspace.path().to_path_buf();
            if let Err(e) = workspace.cleanup() {
                warn!(?path, "Could not remove run audio: {}", e);
                diagnostics.push(format!("could not remove {:?}: {}", path, e));
            }
            None
        };

        Ok(Production {
            directives,
            cast,
            sfx,
            voices,
            timeline,
            report,
            diagnostics,
            audio_dir,
        })
    }
}

fn fail(phase: Phase, diagnostics: Vec<String>, source: anyhow::Error) -> PipelineError {
    warn!(%phase, "Run aborted: {:#}", source);
    PipelineError {
        phase,
        diagnostics,
        source,
    }
}
