//! # notepdf
//!
//! Add note-taking margins to PDF pages.
//!
//! Every page's canvas is enlarged on one or more edges. The original page
//! is drawn onto the new canvas as a single Form XObject at scale 1.0, so its
//! content stream is carried over byte for byte. The added space is filled
//! with a solid colour or a ruled, grid or dotted pattern.
//!
//! ## Quick Start
//!
//! ```no_run
//! use notepdf::{export_document, FillSpec, MarginConfig, MarginSide};
//!
//! fn main() -> notepdf::Result<()> {
//!     let input = std::fs::read("lecture.pdf")?;
//!
//!     // A quarter of the page width on the right, filled white
//!     let margin = MarginConfig::side(MarginSide::Right, 25.0);
//!     let output = export_document(&input, &margin, &FillSpec::default())?;
//!
//!     std::fs::write("lecture-notes.pdf", output)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lossless**: content streams are transcluded, never re-rendered
//! - **Rotation aware**: `/Rotate` is carried to the new page, not baked in
//! - **Per-page sizing**: percentages resolve against each page's own size
//! - **Previews**: bounded side-by-side preview of the first pages
//! - **Patterns**: lines, grid and dots aligned across adjacent margins

pub mod compose;
pub mod detect;
pub mod error;
pub mod export;
pub mod model;
pub mod placement;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use compose::{
    assemble, AssembleMode, AssembleOptions, Assembly, CancelToken, DocumentInfo, PageInfo,
    PagePolicy, ProgressCallback,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use export::{
    export_document, export_document_with_options, generate_preview,
    generate_preview_with_options, inspect_document, PreviewResult, PREVIEW_PAGE_LIMIT,
};
#[cfg(feature = "async")]
pub use export::{export_document_async, generate_preview_async};
pub use model::{
    Color, FillSpec, MarginConfig, MarginSide, MarginWidth, PatternFill, PatternKind, Point, Rect,
    Rotation, SideSet, Size,
};
pub use placement::{resolve, MarginRect, Placement};

use std::path::Path;

/// Export a PDF file with margins and write the result to `output`.
///
/// # Example
///
/// ```no_run
/// use notepdf::{export_file, FillSpec, MarginConfig, MarginSide};
///
/// let margin = MarginConfig::side(MarginSide::Left, 15.0);
/// export_file("in.pdf", "out.pdf", &margin, &FillSpec::default()).unwrap();
/// ```
pub fn export_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    margin: &MarginConfig,
    fill: &FillSpec,
) -> Result<()> {
    let data = std::fs::read(input)?;
    let bytes = export_document(&data, margin, fill)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

/// Build a preview of a PDF file.
pub fn preview_file<P: AsRef<Path>>(
    input: P,
    margin: &MarginConfig,
    fill: &FillSpec,
) -> Result<PreviewResult> {
    let data = std::fs::read(input)?;
    generate_preview(&data, margin, fill)
}

/// Builder for margin exports.
///
/// # Example
///
/// ```no_run
/// use notepdf::{Color, MarginSide, NotePdf, PatternKind};
///
/// let input = std::fs::read("slides.pdf")?;
/// let output = NotePdf::new()
///     .sides([MarginSide::Left, MarginSide::Top])
///     .width(10.0)
///     .pattern(PatternKind::Dots, 14.4, Color::RULE_GRAY)
///     .skip_bad_pages()
///     .export(&input)?;
/// # Ok::<(), notepdf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct NotePdf {
    margin: MarginConfig,
    fill: FillSpec,
    options: AssembleOptions,
}

impl NotePdf {
    /// Create a new builder: right margin of 25 %, solid white.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole margin configuration.
    pub fn with_margin(mut self, margin: MarginConfig) -> Self {
        self.margin = margin;
        self
    }

    /// Select the sides that receive a margin.
    pub fn sides(mut self, sides: impl IntoIterator<Item = MarginSide>) -> Self {
        self.margin.sides = sides.into_iter().collect();
        self
    }

    /// Same width on every selected side, in percent.
    pub fn width(mut self, percent: f32) -> Self {
        self.margin.width = MarginWidth::Shared(percent);
        self
    }

    /// Separate widths for left/right and top/bottom, in percent.
    pub fn per_axis_width(mut self, horizontal: f32, vertical: f32) -> Self {
        self.margin.width = MarginWidth::PerAxis {
            horizontal,
            vertical,
        };
        self
    }

    /// Replace the fill.
    pub fn with_fill(mut self, fill: FillSpec) -> Self {
        self.fill = fill;
        self
    }

    /// Solid fill.
    pub fn solid(mut self, color: Color) -> Self {
        self.fill = FillSpec::solid(color);
        self
    }

    /// Pattern fill.
    pub fn pattern(mut self, kind: PatternKind, spacing: f32, color: Color) -> Self {
        self.fill = FillSpec::pattern(kind, spacing, color);
        self
    }

    /// Skip pages that cannot be transplanted instead of failing.
    pub fn skip_bad_pages(mut self) -> Self {
        self.options = self.options.skip_bad_pages();
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.options = self.options.with_compression(compress);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.options = self.options.with_cancel(token);
        self
    }

    /// Margin configuration in use.
    pub fn margin(&self) -> &MarginConfig {
        &self.margin
    }

    /// Fill in use.
    pub fn fill(&self) -> &FillSpec {
        &self.fill
    }

    /// Export every page.
    pub fn export(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.export_assembly(data).map(|assembly| assembly.bytes)
    }

    /// Export every page and keep the assembly report.
    pub fn export_assembly(&self, data: &[u8]) -> Result<Assembly> {
        export_document_with_options(data, &self.margin, &self.fill, &self.options)
    }

    /// Build a preview.
    pub fn preview(&self, data: &[u8]) -> Result<PreviewResult> {
        generate_preview_with_options(data, &self.margin, &self.fill, &self.options)
    }
}
