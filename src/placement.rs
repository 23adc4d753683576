//! Margin geometry: where the original content goes on the enlarged canvas.
//!
//! [`resolve`] is a pure function of the original page size, its rotation
//! and a [`MarginConfig`]. Everything is computed in the page's own
//! unrotated coordinate space, origin bottom-left, so rotation never enters
//! the arithmetic.
//!
//! Corner handling: left and right margins always span the full new height;
//! top and bottom margins span only the original width and start at the
//! content's x-offset. The content rectangle plus the margin rectangles
//! therefore tile the canvas with no gap and no overlap
//! (see [`Placement::tiles_canvas`]).

use serde::Serialize;

use crate::model::{MarginConfig, MarginSide, Point, Rect, Rotation, Size};

/// One filled margin region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginRect {
    pub side: MarginSide,
    pub rect: Rect,
}

/// Resolved geometry for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Size of the new page
    pub canvas: Size,
    /// Where the original page's bottom-left corner lands
    pub content_offset: Point,
    /// Size of the original page (the transcluded region)
    pub content_size: Size,
    /// Rotation carried from the original page
    pub rotation: Rotation,
    /// Margin regions, in resolution order (right, left, top, bottom)
    pub margins: Vec<MarginRect>,
}

impl Placement {
    /// Placement that leaves the page unchanged.
    pub fn identity(page: Size, rotation: Rotation) -> Self {
        Self {
            canvas: page,
            content_offset: Point::origin(),
            content_size: page,
            rotation,
            margins: Vec::new(),
        }
    }

    /// Region occupied by the original content.
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.content_offset.x,
            self.content_offset.y,
            self.content_size.width,
            self.content_size.height,
        )
    }

    /// Margin rectangle for `side`, if selected.
    pub fn margin(&self, side: MarginSide) -> Option<Rect> {
        self.margins.iter().find(|m| m.side == side).map(|m| m.rect)
    }

    /// Margin rectangles without their side tags.
    pub fn margin_rects(&self) -> Vec<Rect> {
        self.margins.iter().map(|m| m.rect).collect()
    }

    /// Whether the placement leaves the canvas unchanged.
    pub fn is_identity(&self) -> bool {
        self.margins.is_empty()
            && self.content_offset == Point::origin()
            && self.canvas == self.content_size
    }

    /// Check that content and margins cover the canvas exactly once.
    ///
    /// Holds when every piece lies inside the canvas, no two pieces share
    /// area, and the piece areas sum to the canvas area. `tolerance` is an
    /// absolute slack in points for edges and scales to area for the sums.
    pub fn tiles_canvas(&self, tolerance: f32) -> bool {
        let canvas = Rect::from_size(self.canvas);
        let mut pieces = Vec::with_capacity(self.margins.len() + 1);
        pieces.push(self.content_rect());
        pieces.extend(self.margin_rects());

        if pieces
            .iter()
            .any(|p| p.is_empty() || !canvas.contains_rect(p, tolerance))
        {
            return false;
        }

        let perimeter = 2.0 * (self.canvas.width + self.canvas.height);
        let area_tolerance = tolerance * perimeter;

        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                if a.intersection_area(b) > area_tolerance {
                    return false;
                }
            }
        }

        let covered: f32 = pieces.iter().map(Rect::area).sum();
        (covered - canvas.area()).abs() <= area_tolerance
    }
}

/// Resolve the placement of a page of `page` size under `config`.
///
/// Percentages are converted with the page's own dimensions. Validation is
/// the caller's job ([`MarginConfig::validate`]); a zero width resolves to a
/// zero-sized margin which is left out of [`Placement::margins`].
pub fn resolve(page: Size, rotation: Rotation, config: &MarginConfig) -> Placement {
    let widths = config.resolve_widths(page);
    let sides = config.sides;

    let left = if sides.contains(MarginSide::Left) {
        widths.horizontal
    } else {
        0.0
    };
    let right = if sides.contains(MarginSide::Right) {
        widths.horizontal
    } else {
        0.0
    };
    let bottom = if sides.contains(MarginSide::Bottom) {
        widths.vertical
    } else {
        0.0
    };
    let top = if sides.contains(MarginSide::Top) {
        widths.vertical
    } else {
        0.0
    };

    let canvas = Size::new(page.width + left + right, page.height + bottom + top);
    let content_offset = Point::new(left, bottom);

    let mut margins = Vec::with_capacity(sides.len());
    for side in sides.iter() {
        let rect = match side {
            MarginSide::Right => Rect::new(page.width + left, 0.0, right, canvas.height),
            MarginSide::Left => Rect::new(0.0, 0.0, left, canvas.height),
            MarginSide::Top => Rect::new(left, page.height + bottom, page.width, top),
            MarginSide::Bottom => Rect::new(left, 0.0, page.width, bottom),
        };
        if !rect.is_empty() {
            margins.push(MarginRect { side, rect });
        }
    }

    log::trace!(
        "placement {}x{} -> {}x{} offset ({}, {})",
        page.width,
        page.height,
        canvas.width,
        canvas.height,
        content_offset.x,
        content_offset.y
    );

    Placement {
        canvas,
        content_offset,
        content_size: page,
        rotation,
        margins,
    }
}
