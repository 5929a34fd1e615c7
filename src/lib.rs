//! # Flatland Studio
//!
//! Turns a plain-text, two-character dialogue script into a timed sequence of
//! audiovisual cues: camera focus changes, voice lines, sound effects and
//! background color changes, played through a rendering collaborator.
//!
//! The work is split across the workspace crates, re-exported here:
//! - [`flatland_schema`]: the flat `{speaker, text}` record list handed between stages.
//! - [`flatland_tts`]: speech synthesis providers and the batch synthesizer.
//! - [`flatland_core`]: parser, cast, asset resolution, timeline and playback.
//! - [`flatland_pipeline`]: configuration and the phase-by-phase [`Studio`] runner.

pub use flatland_core;
pub use flatland_pipeline;
pub use flatland_schema;
pub use flatland_tts;

pub use flatland_core::{
    parse_script, ActionLog, ActorProfileRegistry, Directive, PlaybackDriver, RenderBackend,
    Timeline, TimelineBuilder,
};
pub use flatland_pipeline::{PipelineError, Production, Studio, StudioConfig};
