//! Margin configuration: which edges grow, and by how much.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geometry::Size;
use crate::error::{Error, Result};

/// One edge of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MarginSide {
    /// All sides in resolution order.
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Right,
        MarginSide::Left,
        MarginSide::Top,
        MarginSide::Bottom,
    ];

    /// Left and right grow the page horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, MarginSide::Left | MarginSide::Right)
    }

    fn bit(self) -> u8 {
        match self {
            MarginSide::Left => 0b0001,
            MarginSide::Right => 0b0010,
            MarginSide::Top => 0b0100,
            MarginSide::Bottom => 0b1000,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            MarginSide::Left => "left",
            MarginSide::Right => "right",
            MarginSide::Top => "top",
            MarginSide::Bottom => "bottom",
        }
    }
}

impl fmt::Display for MarginSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarginSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(MarginSide::Left),
            "right" | "r" => Ok(MarginSide::Right),
            "top" | "t" => Ok(MarginSide::Top),
            "bottom" | "b" => Ok(MarginSide::Bottom),
            other => Err(Error::InvalidMargin(format!("unknown side '{}'", other))),
        }
    }
}

/// A set of selected sides.
///
/// Serializes as a list of side names, e.g. `["left", "top"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<MarginSide>", into = "Vec<MarginSide>")]
pub struct SideSet(u8);

impl SideSet {
    /// No sides selected.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set containing exactly one side.
    pub fn only(side: MarginSide) -> Self {
        Self(side.bit())
    }

    /// Builder-style insert.
    pub fn with(mut self, side: MarginSide) -> Self {
        self.insert(side);
        self
    }

    /// Add a side.
    pub fn insert(&mut self, side: MarginSide) {
        self.0 |= side.bit();
    }

    /// Whether `side` is selected.
    pub fn contains(&self, side: MarginSide) -> bool {
        self.0 & side.bit() != 0
    }

    /// Whether no side is selected.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of selected sides.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// How many of left/right are selected (0, 1 or 2).
    pub fn horizontal_count(&self) -> usize {
        self.iter().filter(|s| s.is_horizontal()).count()
    }

    /// How many of top/bottom are selected (0, 1 or 2).
    pub fn vertical_count(&self) -> usize {
        self.iter().filter(|s| !s.is_horizontal()).count()
    }

    /// Selected sides in resolution order (right, left, top, bottom).
    pub fn iter(&self) -> impl Iterator<Item = MarginSide> + '_ {
        MarginSide::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl FromIterator<MarginSide> for SideSet {
    fn from_iter<I: IntoIterator<Item = MarginSide>>(iter: I) -> Self {
        let mut set = SideSet::empty();
        for side in iter {
            set.insert(side);
        }
        set
    }
}

impl From<Vec<MarginSide>> for SideSet {
    fn from(sides: Vec<MarginSide>) -> Self {
        sides.into_iter().collect()
    }
}

impl From<SideSet> for Vec<MarginSide> {
    fn from(set: SideSet) -> Self {
        set.iter().collect()
    }
}

impl FromStr for SideSet {
    type Err = Error;

    /// Parse a comma separated list such as `"left,top"`.
    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(MarginSide::from_str)
            .collect()
    }
}

impl fmt::Display for SideSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(MarginSide::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Margin width as a percentage of the relevant original page dimension.
///
/// Serializes as a bare number for a shared width, or as
/// `{"horizontal": h, "vertical": v}` for per-axis widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginWidth {
    /// One percentage for every selected side.
    Shared(f32),
    /// Separate percentages for left/right and top/bottom.
    PerAxis {
        /// Applied to left/right, relative to the page width
        horizontal: f32,
        /// Applied to top/bottom, relative to the page height
        vertical: f32,
    },
}

impl MarginWidth {
    /// Percentage used for left/right.
    pub fn horizontal_percent(&self) -> f32 {
        match *self {
            MarginWidth::Shared(pct) => pct,
            MarginWidth::PerAxis { horizontal, .. } => horizontal,
        }
    }

    /// Percentage used for top/bottom.
    pub fn vertical_percent(&self) -> f32 {
        match *self {
            MarginWidth::Shared(pct) => pct,
            MarginWidth::PerAxis { vertical, .. } => vertical,
        }
    }
}

/// Margin widths resolved to absolute units for one page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AbsoluteWidths {
    /// Width of each left/right margin
    pub horizontal: f32,
    /// Height of each top/bottom margin
    pub vertical: f32,
}

/// Which sides to extend and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginConfig {
    /// Sides that receive a margin
    pub sides: SideSet,
    /// Width, in percent of the original page dimension
    pub width: MarginWidth,
}

impl MarginConfig {
    /// Same percentage on every selected side.
    pub fn new(sides: SideSet, percent: f32) -> Self {
        Self {
            sides,
            width: MarginWidth::Shared(percent),
        }
    }

    /// Separate percentages for the horizontal and vertical axes.
    pub fn per_axis(sides: SideSet, horizontal: f32, vertical: f32) -> Self {
        Self {
            sides,
            width: MarginWidth::PerAxis {
                horizontal,
                vertical,
            },
        }
    }

    /// Single-side shorthand.
    pub fn side(side: MarginSide, percent: f32) -> Self {
        Self::new(SideSet::only(side), percent)
    }

    /// Reject empty selections and non-positive widths.
    ///
    /// Only the widths of axes that are actually selected are checked.
    pub fn validate(&self) -> Result<()> {
        if self.sides.is_empty() {
            return Err(Error::InvalidMargin(
                "at least one side must be selected".to_string(),
            ));
        }
        if self.sides.horizontal_count() > 0 {
            check_percent("horizontal", self.width.horizontal_percent())?;
        }
        if self.sides.vertical_count() > 0 {
            check_percent("vertical", self.width.vertical_percent())?;
        }
        Ok(())
    }

    /// Convert the percentages to absolute units for a page of `page` size.
    ///
    /// Left/right use the page's own width, top/bottom its own height.
    pub fn resolve_widths(&self, page: Size) -> AbsoluteWidths {
        AbsoluteWidths {
            horizontal: page.width * self.width.horizontal_percent() / 100.0,
            vertical: page.height * self.width.vertical_percent() / 100.0,
        }
    }
}

impl Default for MarginConfig {
    /// A quarter of the page width added on the right.
    fn default() -> Self {
        Self::side(MarginSide::Right, 25.0)
    }
}

fn check_percent(axis: &str, percent: f32) -> Result<()> {
    if !percent.is_finite() || percent <= 0.0 {
        return Err(Error::InvalidMargin(format!(
            "{} width must be a positive percentage, got {}",
            axis, percent
        )));
    }
    Ok(())
}
