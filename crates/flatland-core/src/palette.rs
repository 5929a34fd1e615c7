//! Scene backdrop palette.
//!
//! `[SCENE: NAME]` resolves in three steps: the fixed scene table below, then
//! the generic [`ColorName`] table, then [`DEFAULT_BACKGROUND`].

use crate::types::{Color, ColorName};
use serde::{Deserialize, Serialize};

/// Stage background before any scene cue.
pub const DEFAULT_BACKGROUND: &str = "#111111";

const SCENE_PALETTE: &[(&str, &str)] = &[
    ("FOREST", "#1B4D2E"),
    ("OCEAN", "#0E3A5C"),
    ("BEACH", "#E8D5A3"),
    ("DESERT", "#C2A26B"),
    ("SPACE", "#05051A"),
    ("NIGHT", "#0B1026"),
    ("CITY", "#3A3A46"),
    ("OFFICE", "#5B6470"),
    ("SUNSET", "#E0724A"),
    ("SNOW", "#E8EEF2"),
    ("CAVE", "#2A2420"),
    ("STAGE", DEFAULT_BACKGROUND),
];

/// Which table a scene name was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteSource {
    Scene,
    Generic,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneColor {
    pub color: Color,
    pub source: PaletteSource,
}

pub fn default_background() -> Color {
    Color::from_hex(DEFAULT_BACKGROUND).unwrap_or(Color::BLACK)
}

/// Resolves a scene name to a backdrop color. Never fails.
pub fn resolve_scene_color(name: &str) -> SceneColor {
    let name = name.trim();

    let scene = SCENE_PALETTE
        .iter()
        .find(|(scene, _)| scene.eq_ignore_ascii_case(name))
        .and_then(|(_, hex)| Color::from_hex(hex));
    if let Some(color) = scene {
        return SceneColor {
            color,
            source: PaletteSource::Scene,
        };
    }

    if let Some(named) = ColorName::parse(name) {
        return SceneColor {
            color: named.color(),
            source: PaletteSource::Generic,
        };
    }

    SceneColor {
        color: default_background(),
        source: PaletteSource::Default,
    }
}
