//! # Cast Module
//!
//! The Actor Profile Registry: the two named actors, their appearance, and
//! how speaker names map onto them.
//!
//! ## Responsibilities
//! - **Profiles**: default appearance is square/red for the primary actor and
//!   circle/blue for the secondary actor.
//! - **Config pre-pass**: every `[CONFIG: ...]` cue in the script is applied
//!   before timeline building, wherever it appears.
//! - **Speaker matching**: upper-cased substring containment, primary first.

use crate::parser::Directive;
use crate::types::{ColorName, Shape};
use flatland_tts::VoiceIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_PRIMARY_ACTOR: &str = "BARRY";
pub const DEFAULT_SECONDARY_ACTOR: &str = "CARL";

/// Who a camera move or animation is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRef {
    Primary,
    Secondary,
    /// Both actors, i.e. the wide shot.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub shape: Shape,
    pub color: ColorName,
}

impl ActorProfile {
    pub fn new(shape: Shape, color: ColorName) -> Self {
        Self { shape, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub name: String,
    pub profile: ActorProfile,
}

/// The two actors of a run, threaded explicitly through the config pre-pass
/// and timeline building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorProfileRegistry {
    primary: CastMember,
    secondary: CastMember,
}

impl Default for ActorProfileRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_ACTOR, DEFAULT_SECONDARY_ACTOR)
    }
}

impl ActorProfileRegistry {
    pub fn new(primary_name: &str, secondary_name: &str) -> Self {
        Self {
            primary: CastMember {
                name: primary_name.trim().to_uppercase(),
                profile: ActorProfile::new(Shape::Square, ColorName::Red),
            },
            secondary: CastMember {
                name: secondary_name.trim().to_uppercase(),
                profile: ActorProfile::new(Shape::Circle, ColorName::Blue),
            },
        }
    }

    /// Builds the registry and applies every config cue in `directives`.
    pub fn from_directives(primary_name: &str, secondary_name: &str, directives: &[Directive]) -> Self {
        let mut registry = Self::new(primary_name, secondary_name);
        registry.apply_configs(directives);
        registry
    }

    pub fn primary(&self) -> &CastMember {
        &self.primary
    }

    pub fn secondary(&self) -> &CastMember {
        &self.secondary
    }

    /// Profile for a single actor; `Both` has none.
    pub fn profile(&self, actor: ActorRef) -> Option<&ActorProfile> {
        match actor {
            ActorRef::Primary => Some(&self.primary.profile),
            ActorRef::Secondary => Some(&self.secondary.profile),
            ActorRef::Both => None,
        }
    }

    /// Decides which actor a speaker line belongs to.
    pub fn match_speaker(&self, speaker: &str) -> ActorRef {
        let speaker = speaker.to_uppercase();
        if !self.primary.name.is_empty() && speaker.contains(&self.primary.name) {
            ActorRef::Primary
        } else if !self.secondary.name.is_empty() && speaker.contains(&self.secondary.name) {
            ActorRef::Secondary
        } else {
            ActorRef::Both
        }
    }

    /// Voice used for a speaker: the secondary voice when the speaker name
    /// contains the secondary actor's name, the primary voice otherwise.
    pub fn voice_for(&self, speaker: &str) -> VoiceIdentity {
        let speaker = speaker.to_uppercase();
        if !self.secondary.name.is_empty() && speaker.contains(&self.secondary.name) {
            VoiceIdentity::Secondary
        } else {
            VoiceIdentity::Primary
        }
    }

    /// Applies one config override. Unknown shape and color names fall back
    /// to defaults; unknown actor names change nothing.
    pub fn apply(&mut self, actor_name: &str, shape: &str, color: &str) -> bool {
        let actor_name = actor_name.trim();
        let member = if self.primary.name.eq_ignore_ascii_case(actor_name) {
            &mut self.primary
        } else if self.secondary.name.eq_ignore_ascii_case(actor_name) {
            &mut self.secondary
        } else {
            debug!(actor = actor_name, "CONFIG names no cast member, ignoring");
            return false;
        };

        member.profile = ActorProfile::new(Shape::parse_or_default(shape), ColorName::parse_or_default(color));
        info!(
            actor = %member.name,
            shape = %member.profile.shape,
            color = %member.profile.color,
            "Actor profile overridden"
        );
        true
    }

    /// Pre-pass over the whole script. Returns how many overrides applied.
    pub fn apply_configs(&mut self, directives: &[Directive]) -> usize {
        directives
            .iter()
            .filter(|d| match d {
                Directive::ActorConfig {
                    actor_name,
                    shape,
                    color,
                } => self.apply(actor_name, shape, color),
                _ => false,
            })
            .count()
    }
}
