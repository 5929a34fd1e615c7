//! # Types Module
//!
//! Shared data types used across the studio.
//!
//! ## Responsibilities
//! - **Color**: RGBA color with hex conversion.
//! - **ColorName**: the closed table of named colors a script may use.
//! - **Shape**: the closed set of actor body shapes.
//!
//! Names are matched case-insensitively against explicit tables; anything
//! outside a table falls back to a typed default instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a RGBA color in float format (0.0 - 1.0).
///
/// Serialized as a `#RRGGBB` hex string.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parses `#RRGGBB` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Formats as `#RRGGBB`, dropping alpha.
    pub fn to_hex(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", c(self.r), c(self.g), c(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color '{}'", value))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A named color from the fixed script palette.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Teal,
    Gold,
    Maroon,
    White,
    /// Neutral fallback for unrecognized names.
    #[default]
    Gray,
    Black,
}

impl ColorName {
    pub const ALL: [ColorName; 13] = [
        ColorName::Red,
        ColorName::Blue,
        ColorName::Green,
        ColorName::Yellow,
        ColorName::Orange,
        ColorName::Purple,
        ColorName::Pink,
        ColorName::Teal,
        ColorName::Gold,
        ColorName::Maroon,
        ColorName::White,
        ColorName::Gray,
        ColorName::Black,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("GREY") {
            return Some(ColorName::Gray);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Like [`ColorName::parse`], falling back to the neutral default.
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorName::Red => "RED",
            ColorName::Blue => "BLUE",
            ColorName::Green => "GREEN",
            ColorName::Yellow => "YELLOW",
            ColorName::Orange => "ORANGE",
            ColorName::Purple => "PURPLE",
            ColorName::Pink => "PINK",
            ColorName::Teal => "TEAL",
            ColorName::Gold => "GOLD",
            ColorName::Maroon => "MAROON",
            ColorName::White => "WHITE",
            ColorName::Gray => "GRAY",
            ColorName::Black => "BLACK",
        }
    }

    pub fn color(&self) -> Color {
        let (r, g, b) = match self {
            ColorName::Red => (0xFC, 0x62, 0x55),
            ColorName::Blue => (0x58, 0xC4, 0xDD),
            ColorName::Green => (0x83, 0xC1, 0x67),
            ColorName::Yellow => (0xFF, 0xFF, 0x00),
            ColorName::Orange => (0xFF, 0x86, 0x2F),
            ColorName::Purple => (0x9A, 0x72, 0xAC),
            ColorName::Pink => (0xD1, 0x47, 0xBD),
            ColorName::Teal => (0x5C, 0xD0, 0xB3),
            ColorName::Gold => (0xF0, 0xAC, 0x5F),
            ColorName::Maroon => (0xC5, 0x5F, 0x73),
            ColorName::White => (0xFF, 0xFF, 0xFF),
            ColorName::Gray => (0x88, 0x88, 0x88),
            ColorName::Black => (0x00, 0x00, 0x00),
        };
        Color::from_rgb8(r, g, b)
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Body shape of an actor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Square,
    Circle,
    Triangle,
    Star,
    Hexagon,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Square,
        Shape::Circle,
        Shape::Triangle,
        Shape::Star,
        Shape::Hexagon,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Like [`Shape::parse`], falling back to a square.
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Square => "SQUARE",
            Shape::Circle => "CIRCLE",
            Shape::Triangle => "TRIANGLE",
            Shape::Star => "STAR",
            Shape::Hexagon => "HEXAGON",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        let c = Color::from_hex("#111111").unwrap();
        assert_eq!(c.to_hex(), "#111111");
        assert_eq!(Color::from_hex("fc6255"), Some(ColorName::Red.color()));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&ColorName::Blue.color()).unwrap();
        assert_eq!(json, "\"#58C4DD\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#58C4DD");
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(ColorName::parse("green"), Some(ColorName::Green));
        assert_eq!(ColorName::parse(" Grey "), Some(ColorName::Gray));
        assert_eq!(Shape::parse("TriAngle"), Some(Shape::Triangle));
    }

    #[test]
    fn test_unknown_names_fall_back() {
        assert_eq!(ColorName::parse("CHARTREUSE"), None);
        assert_eq!(ColorName::parse_or_default("CHARTREUSE"), ColorName::Gray);
        assert_eq!(Shape::parse_or_default("DODECAHEDRON"), Shape::Square);
    }
}
