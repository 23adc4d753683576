//! Margin painting.
//!
//! Fills are appended after the transcluded content. Pattern marks sit on a
//! lattice anchored at the canvas origin, so a pattern continues across the
//! shared edge of adjacent margins. Every pattern is clipped to its own
//! rectangle.

use lopdf::content::Operation;
use lopdf::Object;

use super::transplant::NewPage;
use crate::model::{FillSpec, PatternFill, PatternKind, Rect};

/// Marks closer than this to a rectangle edge are dropped.
const EDGE_EPSILON: f32 = 1e-3;

/// Draw `fill` into each of `rects` on `page`.
pub fn paint(page: &mut NewPage, rects: &[Rect], fill: &FillSpec) {
    for rect in rects {
        page.operations.extend(fill_operations(rect, fill));
    }
}

/// Content stream operations filling one rectangle.
pub fn fill_operations(rect: &Rect, fill: &FillSpec) -> Vec<Operation> {
    if rect.is_empty() {
        return Vec::new();
    }
    match fill {
        FillSpec::Solid { color } => vec![
            Operation::new("q", vec![]),
            Operation::new("rg", color.operands()),
            Operation::new("re", rect_operands(rect)),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ],
        FillSpec::Pattern(pattern) => pattern_operations(rect, pattern),
    }
}

fn pattern_operations(rect: &Rect, pattern: &PatternFill) -> Vec<Operation> {
    let xs = lattice(rect.x, rect.right(), pattern.spacing);
    let ys = lattice(rect.y, rect.top(), pattern.spacing);

    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("re", rect_operands(rect)),
        Operation::new("W", vec![]),
        Operation::new("n", vec![]),
        Operation::new("RG", pattern.color.operands()),
        Operation::new("w", vec![Object::Real(pattern.line_width)]),
    ];

    match pattern.kind {
        PatternKind::Lines => {
            for &y in &ys {
                ops.extend(segment(rect.x, y, rect.right(), y));
            }
        }
        PatternKind::Grid => {
            for &y in &ys {
                ops.extend(segment(rect.x, y, rect.right(), y));
            }
            for &x in &xs {
                ops.extend(segment(x, rect.y, x, rect.top()));
            }
        }
        PatternKind::Dots => {
            // Round caps turn zero-length strokes into dots of the line width
            ops.push(Operation::new("J", vec![1.into()]));
            for &y in &ys {
                for &x in &xs {
                    ops.extend(segment(x, y, x, y));
                }
            }
        }
    }

    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Multiples of `spacing` strictly inside `(start, end)`.
pub(crate) fn lattice(start: f32, end: f32, spacing: f32) -> Vec<f32> {
    let mut values = Vec::new();
    if spacing.is_nan() || spacing <= 0.0 || end <= start {
        return values;
    }
    let mut k = (start / spacing).floor() as i64;
    loop {
        let v = k as f32 * spacing;
        if v >= end - EDGE_EPSILON {
            break;
        }
        if v > start + EDGE_EPSILON {
            values.push(v);
        }
        k += 1;
    }
    values
}

fn segment(x1: f32, y1: f32, x2: f32, y2: f32) -> [Operation; 2] {
    [
        Operation::new("m", vec![Object::Real(x1), Object::Real(y1)]),
        Operation::new("l", vec![Object::Real(x2), Object::Real(y2)]),
    ]
}

fn rect_operands(rect: &Rect) -> Vec<Object> {
    vec![
        Object::Real(rect.x),
        Object::Real(rect.y),
        Object::Real(rect.width),
        Object::Real(rect.height),
    ]
}
