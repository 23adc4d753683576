//! Value types shared by the geometry resolver and the composer.
//!
//! Everything here is plain data: page geometry in PDF user-space units,
//! the margin selection with its percentage widths, and the fill drawn into
//! the added space. Margin and fill types derive serde so they can be passed
//! around as JSON.

mod fill;
mod geometry;
mod margin;

pub use fill::{Color, FillSpec, PatternFill, PatternKind, DEFAULT_LINE_WIDTH, MIN_PATTERN_SPACING};
pub use geometry::{Point, Rect, Rotation, Size};
pub use margin::{AbsoluteWidths, MarginConfig, MarginSide, MarginWidth, SideSet};
