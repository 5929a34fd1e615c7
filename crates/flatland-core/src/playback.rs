//! # Playback Module
//!
//! Drives the rendering collaborator through a built [`Timeline`], one event
//! at a time, strictly in order.
//!
//! ## Responsibilities
//! - **State machine**: `Idle → Focused → PlayingLine | PlayingSfx |
//!   ChangingScene → ... → Finished`. No branching, retries or skipping.
//! - **Staging**: background and both actors are placed before the first
//!   event; both actors fade out after the last one.
//! - **Action log**: [`ActionLog`] records the primitive calls so they can be
//!   inspected in tests or handed to an out-of-process renderer.
//!
//! ## Key Types
//! - `RenderBackend`: the primitive actions a renderer must support.
//! - `PlaybackDriver`: the state machine.
//! - `ActionLog`: recording backend.

use crate::cast::{ActorProfile, ActorProfileRegistry, ActorRef};
use crate::errors::RenderError;
use crate::palette::default_background;
use crate::timeline::{EventKind, Timeline, TimelineEvent, FOCUS_TRANSITION_SECONDS};
use crate::types::{Color, ColorName, Shape};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Length of the hop an actor does when it speaks.
pub const EMPHASIS_SECONDS: f64 = 0.25;
/// Closing fade for both actors.
pub const FADE_OUT_SECONDS: f64 = 2.0;
/// Camera frame height when framing a single actor.
pub const ACTOR_FIT_HEIGHT: f32 = 8.0;
/// Camera frame height for the wide shot.
pub const WIDE_FIT_HEIGHT: f32 = 14.0;
/// Horizontal distance of each actor from the stage centre.
pub const STAGE_OFFSET: f32 = 3.0;

/// Primitive actions consumed from the rendering engine.
///
/// Every call is a step on the scene's clock: the renderer is expected to
/// play actions back to back in the order received.
pub trait RenderBackend {
    /// Puts an actor on stage at horizontal position `x`.
    fn place_actor(&mut self, actor: ActorRef, profile: &ActorProfile, x: f32) -> Result<(), RenderError>;

    fn reposition_camera(&mut self, target: ActorRef, fit_height: f32, transition_seconds: f64) -> Result<(), RenderError>;

    /// Starts playing an audio file at the current point in time.
    fn attach_audio(&mut self, path: &Path) -> Result<(), RenderError>;

    /// A brief shift-and-return of the actor.
    fn animate_emphasis(&mut self, actor: ActorRef, duration_seconds: f64) -> Result<(), RenderError>;

    fn wait(&mut self, duration_seconds: f64) -> Result<(), RenderError>;

    fn set_background_color(&mut self, color: Color) -> Result<(), RenderError>;

    fn fade_out(&mut self, actors: &[ActorRef], duration_seconds: f64) -> Result<(), RenderError>;
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RenderAction {
    PlaceActor {
        actor: ActorRef,
        shape: Shape,
        color: ColorName,
        fill: Color,
        x: f32,
    },
    RepositionCamera {
        target: ActorRef,
        fit_height: f32,
        transition_seconds: f64,
    },
    AttachAudio {
        path: PathBuf,
    },
    AnimateEmphasis {
        actor: ActorRef,
        duration_seconds: f64,
    },
    Wait {
        duration_seconds: f64,
    },
    SetBackgroundColor {
        color: Color,
    },
    FadeOut {
        actors: Vec<ActorRef>,
        duration_seconds: f64,
    },
}

impl RenderAction {
    /// Scene time consumed by the action.
    pub fn duration_seconds(&self) -> f64 {
        match self {
            RenderAction::RepositionCamera {
                transition_seconds, ..
            } => *transition_seconds,
            RenderAction::AnimateEmphasis { duration_seconds, .. }
            | RenderAction::Wait { duration_seconds }
            | RenderAction::FadeOut { duration_seconds, .. } => *duration_seconds,
            _ => 0.0,
        }
    }
}

/// Records every primitive call in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    pub actions: Vec<RenderAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total scene time covered by the recorded actions.
    pub fn elapsed_seconds(&self) -> f64 {
        self.actions.iter().map(RenderAction::duration_seconds).sum()
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the action script for an external renderer.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl RenderBackend for ActionLog {
    fn place_actor(&mut self, actor: ActorRef, profile: &ActorProfile, x: f32) -> Result<(), RenderError> {
        self.actions.push(RenderAction::PlaceActor {
            actor,
            shape: profile.shape,
            color: profile.color,
            fill: profile.color.color(),
            x,
        });
        Ok(())
    }

    fn reposition_camera(&mut self, target: ActorRef, fit_height: f32, transition_seconds: f64) -> Result<(), RenderError> {
        self.actions.push(RenderAction::RepositionCamera {
            target,
            fit_height,
            transition_seconds,
        });
        Ok(())
    }

    fn attach_audio(&mut self, path: &Path) -> Result<(), RenderError> {
        self.actions.push(RenderAction::AttachAudio {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn animate_emphasis(&mut self, actor: ActorRef, duration_seconds: f64) -> Result<(), RenderError> {
        self.actions.push(RenderAction::AnimateEmphasis {
            actor,
            duration_seconds,
        });
        Ok(())
    }

    fn wait(&mut self, duration_seconds: f64) -> Result<(), RenderError> {
        self.actions.push(RenderAction::Wait { duration_seconds });
        Ok(())
    }

    fn set_background_color(&mut self, color: Color) -> Result<(), RenderError> {
        self.actions.push(RenderAction::SetBackgroundColor { color });
        Ok(())
    }

    fn fade_out(&mut self, actors: &[ActorRef], duration_seconds: f64) -> Result<(), RenderError> {
        self.actions.push(RenderAction::FadeOut {
            actors: actors.to_vec(),
            duration_seconds,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Focused(ActorRef),
    PlayingLine,
    PlayingSfx,
    ChangingScene,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackReport {
    pub events_played: usize,
    /// Scene time consumed, including staging and the closing fade.
    pub elapsed_seconds: f64,
    pub final_background: Color,
}

/// Consumes a timeline and issues render calls in timeline order.
pub struct PlaybackDriver<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    state: PlaybackState,
    background: Color,
    elapsed: f64,
}

impl<'a, B: RenderBackend + ?Sized> PlaybackDriver<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            state: PlaybackState::Idle,
            background: default_background(),
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Plays the whole timeline. Any backend failure aborts the run.
    #[instrument(level = "info", skip_all, fields(events = timeline.len()))]
    pub fn run(&mut self, cast: &ActorProfileRegistry, timeline: &Timeline) -> Result<PlaybackReport, RenderError> {
        if self.state != PlaybackState::Idle {
            return Err(RenderError::AlreadyFinished);
        }

        self.stage(cast)?;
        for event in &timeline.events {
            self.step(event)?;
        }
        self.finish()?;

        let report = PlaybackReport {
            events_played: timeline.len(),
            elapsed_seconds: self.elapsed,
            final_background: self.background,
        };
        info!(elapsed = report.elapsed_seconds, "Playback finished");
        Ok(report)
    }

    fn stage(&mut self, cast: &ActorProfileRegistry) -> Result<(), RenderError> {
        self.backend.set_background_color(self.background)?;
        self.backend
            .place_actor(ActorRef::Primary, &cast.primary().profile, -STAGE_OFFSET)?;
        self.backend
            .place_actor(ActorRef::Secondary, &cast.secondary().profile, STAGE_OFFSET)?;
        Ok(())
    }

    fn step(&mut self, event: &TimelineEvent) -> Result<(), RenderError> {
        match event.kind {
            EventKind::FocusA | EventKind::FocusB | EventKind::FocusWide => {
                let target = match event.kind {
                    EventKind::FocusA => ActorRef::Primary,
                    EventKind::FocusB => ActorRef::Secondary,
                    _ => ActorRef::Both,
                };
                let fit_height = match target {
                    ActorRef::Both => WIDE_FIT_HEIGHT,
                    _ => ACTOR_FIT_HEIGHT,
                };
                self.transition(PlaybackState::Focused(target));
                self.backend
                    .reposition_camera(target, fit_height, FOCUS_TRANSITION_SECONDS)?;
                self.elapsed += FOCUS_TRANSITION_SECONDS;
            }
            EventKind::PlayLine => {
                self.transition(PlaybackState::PlayingLine);
                self.play(event, event.camera_target.unwrap_or(ActorRef::Both))?;
            }
            EventKind::PlaySfx => {
                self.transition(PlaybackState::PlayingSfx);
                self.play(event, ActorRef::Both)?;
            }
            EventKind::SceneColor => {
                self.transition(PlaybackState::ChangingScene);
                if let Some(color) = event.color_value {
                    self.backend.set_background_color(color)?;
                    self.background = color;
                }
            }
        }
        Ok(())
    }

    /// Audio first, then the emphasis hop, then hold for the remainder.
    fn play(&mut self, event: &TimelineEvent, actor: ActorRef) -> Result<(), RenderError> {
        if let Some(path) = event.audio_ref.as_ref().and_then(|a| a.path()) {
            self.backend.attach_audio(path)?;
        }

        self.backend.animate_emphasis(actor, EMPHASIS_SECONDS)?;
        self.elapsed += EMPHASIS_SECONDS;

        let remaining = (event.duration_seconds - EMPHASIS_SECONDS).max(0.0);
        if remaining > 0.0 {
            self.backend.wait(remaining)?;
            self.elapsed += remaining;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.backend
            .fade_out(&[ActorRef::Primary, ActorRef::Secondary], FADE_OUT_SECONDS)?;
        self.elapsed += FADE_OUT_SECONDS;
        self.transition(PlaybackState::Finished);
        Ok(())
    }

    fn transition(&mut self, next: PlaybackState) {
        debug!(from = ?self.state, to = ?next, "Playback state");
        self.state = next;
    }
}
