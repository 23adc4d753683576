//! How the added margin space is filled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest pattern spacing accepted, in points.
///
/// Tighter lattices turn into solid fills at any viewing size and blow up
/// the content stream.
pub const MIN_PATTERN_SPACING: f32 = 2.0;

/// Default stroke width for lines and grids, and dot diameter.
pub const DEFAULT_LINE_WIDTH: f32 = 0.5;

/// An RGB colour with components in `[0, 1]`.
///
/// Serializes as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// Light grey used for patterns when no colour is given.
    pub const RULE_GRAY: Color = Color::rgb(0.75, 0.75, 0.75);

    /// Colour from floating point components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Colour from 8-bit components.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#rrggbb`, `rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || Error::InvalidMargin(format!("invalid colour '{}'", hex));
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self::rgb8(
                    expand(&digits[0..1])?,
                    expand(&digits[1..2])?,
                    expand(&digits[2..3])?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Reject components outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("red", self.r), ("green", self.g), ("blue", self.b)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::InvalidMargin(format!(
                    "colour {} component {} is outside [0, 1]",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Components as PDF operands.
    pub(crate) fn operands(&self) -> Vec<lopdf::Object> {
        vec![
            lopdf::Object::Real(self.r),
            lopdf::Object::Real(self.g),
            lopdf::Object::Real(self.b),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Repeating pattern drawn inside the margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Evenly spaced horizontal rules
    Lines,
    /// Horizontal and vertical rules
    Grid,
    /// Dots on a square lattice
    Dots,
}

impl FromStr for PatternKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "ruled" => Ok(PatternKind::Lines),
            "grid" => Ok(PatternKind::Grid),
            "dots" | "dotted" => Ok(PatternKind::Dots),
            other => Err(Error::InvalidMargin(format!("unknown pattern '{}'", other))),
        }
    }
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

/// Pattern parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternFill {
    pub kind: PatternKind,
    /// Distance between lines or dots, in points
    pub spacing: f32,
    pub color: Color,
    /// Stroke width for lines, diameter for dots
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

impl PatternFill {
    /// Pattern with the default stroke width.
    pub fn new(kind: PatternKind, spacing: f32, color: Color) -> Self {
        Self {
            kind,
            spacing,
            color,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Set the stroke width.
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }
}

/// What to draw in the margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FillSpec {
    /// A single flat colour
    Solid { color: Color },
    /// A repeating pattern on a transparent background
    Pattern(PatternFill),
}

impl FillSpec {
    /// Solid fill in `color`.
    pub fn solid(color: Color) -> Self {
        FillSpec::Solid { color }
    }

    /// Pattern fill with the default stroke width.
    pub fn pattern(kind: PatternKind, spacing: f32, color: Color) -> Self {
        FillSpec::Pattern(PatternFill::new(kind, spacing, color))
    }

    /// Reject out-of-range colours, spacings and stroke widths.
    pub fn validate(&self) -> Result<()> {
        match self {
            FillSpec::Solid { color } => color.validate(),
            FillSpec::Pattern(p) => {
                p.color.validate()?;
                if !p.spacing.is_finite() || p.spacing < MIN_PATTERN_SPACING {
                    return Err(Error::InvalidMargin(format!(
                        "pattern spacing must be at least {} points, got {}",
                        MIN_PATTERN_SPACING, p.spacing
                    )));
                }
                if !p.line_width.is_finite() || p.line_width <= 0.0 {
                    return Err(Error::InvalidMargin(format!(
                        "pattern line width must be positive, got {}",
                        p.line_width
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for FillSpec {
    fn default() -> Self {
        FillSpec::solid(Color::WHITE)
    }
}
