//! # Timeline Module
//!
//! Converts the directive sequence plus resolved assets into the ordered list
//! of [`TimelineEvent`]s executed by the playback driver.
//!
//! ## Rules
//! - `SceneChange` → one `SceneColor` event of zero duration.
//! - `ActorConfig` → nothing (consumed by the cast pre-pass).
//! - `SoundEffect` → one `PlaySfx` event with the tag's fixed duration, or
//!   nothing at all for unknown tags.
//! - `Dialogue` → a focus event followed by a `PlayLine` event lasting
//!   `max(1.5, chars / 14)` seconds.
//!
//! The whole timeline is built before any playback call is issued.

use crate::cast::{ActorProfileRegistry, ActorRef};
use crate::palette::resolve_scene_color;
use crate::parser::Directive;
use crate::sfx::{SfxAsset, SfxLibrary, SfxTag};
use crate::types::Color;
use crate::voice::{VoiceAsset, VoiceCache};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Shortest time a dialogue line stays on screen.
pub const MIN_LINE_SECONDS: f64 = 1.5;
/// Reading-speed heuristic, in characters per second.
pub const READING_CHARS_PER_SECOND: f64 = 14.0;
/// Camera transition time for every focus change.
pub const FOCUS_TRANSITION_SECONDS: f64 = 0.5;

/// On-screen time for a dialogue line.
pub fn line_duration(text: &str) -> f64 {
    (text.chars().count() as f64 / READING_CHARS_PER_SECOND).max(MIN_LINE_SECONDS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    FocusA,
    FocusB,
    FocusWide,
    SceneColor,
    PlaySfx,
    PlayLine,
}

impl EventKind {
    pub fn is_focus(&self) -> bool {
        matches!(self, EventKind::FocusA | EventKind::FocusB | EventKind::FocusWide)
    }

    fn focus_on(actor: ActorRef) -> Self {
        match actor {
            ActorRef::Primary => EventKind::FocusA,
            ActorRef::Secondary => EventKind::FocusB,
            ActorRef::Both => EventKind::FocusWide,
        }
    }
}

/// Audio attached to a play event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioRef {
    Voice(VoiceAsset),
    Sfx(SfxAsset),
}

impl AudioRef {
    /// File to attach, if one exists.
    pub fn path(&self) -> Option<&Path> {
        match self {
            AudioRef::Voice(voice) => Some(&voice.path),
            AudioRef::Sfx(sfx) => sfx.path.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub kind: EventKind,
    pub duration_seconds: f64,
    pub audio_ref: Option<AudioRef>,
    pub camera_target: Option<ActorRef>,
    pub color_value: Option<Color>,
}

impl TimelineEvent {
    fn focus(actor: ActorRef) -> Self {
        Self {
            kind: EventKind::focus_on(actor),
            duration_seconds: FOCUS_TRANSITION_SECONDS,
            audio_ref: None,
            camera_target: Some(actor),
            color_value: None,
        }
    }

    fn line(actor: ActorRef, text: &str, voice: Option<&VoiceAsset>) -> Self {
        Self {
            kind: EventKind::PlayLine,
            duration_seconds: line_duration(text),
            audio_ref: voice.cloned().map(AudioRef::Voice),
            camera_target: Some(actor),
            color_value: None,
        }
    }

    fn sfx(tag: SfxTag, asset: Option<&SfxAsset>) -> Self {
        Self {
            kind: EventKind::PlaySfx,
            duration_seconds: tag.duration_seconds(),
            audio_ref: asset.cloned().map(AudioRef::Sfx),
            camera_target: None,
            color_value: None,
        }
    }

    fn scene(color: Color) -> Self {
        Self {
            kind: EventKind::SceneColor,
            duration_seconds: 0.0,
            audio_ref: None,
            camera_target: None,
            color_value: Some(color),
        }
    }

    /// The SFX tag of a `PlaySfx` event.
    pub fn sfx_tag(&self) -> Option<SfxTag> {
        match &self.audio_ref {
            Some(AudioRef::Sfx(asset)) => Some(asset.tag),
            _ => None,
        }
    }
}

/// What to do with a bracketed cue that names no known sound effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCuePolicy {
    /// Drop the cue silently.
    #[default]
    Drop,
    /// Drop the cue and report it as a warning.
    Warn,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    /// Warnings raised while building (unknown cues under [`UnknownCuePolicy::Warn`]).
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(|e| e.kind).collect()
    }

    /// Sum of all event durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(|e| e.duration_seconds).sum()
    }
}

pub struct TimelineBuilder<'a> {
    cast: &'a ActorProfileRegistry,
    sfx: &'a SfxLibrary,
    voices: &'a VoiceCache,
    policy: UnknownCuePolicy,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(cast: &'a ActorProfileRegistry, sfx: &'a SfxLibrary, voices: &'a VoiceCache) -> Self {
        Self {
            cast,
            sfx,
            voices,
            policy: UnknownCuePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownCuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Walks the directives once, in order.
    pub fn build(&self, directives: &[Directive]) -> Timeline {
        let mut timeline = Timeline::default();

        for (index, directive) in directives.iter().enumerate() {
            match directive {
                Directive::SceneChange { name } => {
                    let scene = resolve_scene_color(name);
                    debug!(scene = %name, color = %scene.color, source = ?scene.source, "Scene change");
                    timeline.events.push(TimelineEvent::scene(scene.color));
                }
                Directive::ActorConfig { .. } => {}
                Directive::SoundEffect { tag } => match SfxTag::parse(tag) {
                    Some(known) => timeline
                        .events
                        .push(TimelineEvent::sfx(known, self.sfx.get(known))),
                    None => self.unknown_cue(index, tag, &mut timeline),
                },
                Directive::Dialogue { speaker, text } => {
                    let actor = self.cast.match_speaker(speaker);
                    timeline.events.push(TimelineEvent::focus(actor));
                    timeline
                        .events
                        .push(TimelineEvent::line(actor, text, self.voices.get(index)));
                }
            }
        }

        timeline
    }

    fn unknown_cue(&self, index: usize, tag: &str, timeline: &mut Timeline) {
        match self.policy {
            UnknownCuePolicy::Drop => debug!(directive = index, tag, "Dropping unknown cue"),
            UnknownCuePolicy::Warn => {
                warn!(directive = index, tag, "Unknown cue dropped");
                timeline
                    .warnings
                    .push(format!("directive {}: unknown cue [{}] was dropped", index, tag));
            }
        }
    }
}
