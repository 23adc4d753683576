//! Export entry points.
//!
//! Both calls are pure functions of the input bytes and the margin
//! configuration. They hold no shared state, so any number of them can run
//! at the same time on different threads.

use crate::compose::{
    assemble, AssembleMode, AssembleOptions, Assembly, DocumentInfo, SourceDocument,
};
use crate::error::Result;
use crate::model::{FillSpec, MarginConfig};

/// Number of pages included in a preview.
pub const PREVIEW_PAGE_LIMIT: usize = 3;

/// Side-by-side preview buffers.
#[derive(Debug, Clone)]
pub struct PreviewResult {
    /// First pages of the source, unmodified
    pub original: Vec<u8>,
    /// Same pages with margins added
    pub transformed: Vec<u8>,
    /// Page count of the whole source document
    pub total_page_count: usize,
}

/// Build preview documents for the first [`PREVIEW_PAGE_LIMIT`] pages.
pub fn generate_preview(
    data: &[u8],
    margin: &MarginConfig,
    fill: &FillSpec,
) -> Result<PreviewResult> {
    generate_preview_with_options(data, margin, fill, &AssembleOptions::default())
}

/// Build preview documents with custom assembly options.
///
/// The original and transformed buffers come from two independent
/// assemblies over the same page range.
pub fn generate_preview_with_options(
    data: &[u8],
    margin: &MarginConfig,
    fill: &FillSpec,
    options: &AssembleOptions,
) -> Result<PreviewResult> {
    let mode = AssembleMode::Preview {
        max_pages: PREVIEW_PAGE_LIMIT,
    };
    let transformed = assemble(data, Some(margin), fill, mode, options)?;
    let original = assemble(data, None, fill, mode, options)?;

    Ok(PreviewResult {
        original: original.bytes,
        transformed: transformed.bytes,
        total_page_count: transformed.total_pages,
    })
}

/// Add margins to every page and return the new document.
pub fn export_document(data: &[u8], margin: &MarginConfig, fill: &FillSpec) -> Result<Vec<u8>> {
    export_document_with_options(data, margin, fill, &AssembleOptions::default())
        .map(|assembly| assembly.bytes)
}

/// Add margins to every page with custom assembly options.
///
/// Returns the whole [`Assembly`] so callers can see skipped pages.
pub fn export_document_with_options(
    data: &[u8],
    margin: &MarginConfig,
    fill: &FillSpec,
    options: &AssembleOptions,
) -> Result<Assembly> {
    assemble(data, Some(margin), fill, AssembleMode::Full, options)
}

/// Report version, page sizes and rotations without transforming anything.
pub fn inspect_document(data: &[u8]) -> Result<DocumentInfo> {
    SourceDocument::load_bytes(data)?.info()
}

/// Async [`export_document`], run on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn export_document_async(
    data: Vec<u8>,
    margin: MarginConfig,
    fill: FillSpec,
) -> Result<Vec<u8>> {
    run_blocking(move || export_document(&data, &margin, &fill)).await
}

/// Async [`generate_preview`], run on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn generate_preview_async(
    data: Vec<u8>,
    margin: MarginConfig,
    fill: FillSpec,
) -> Result<PreviewResult> {
    run_blocking(move || generate_preview(&data, &margin, &fill)).await
}

#[cfg(feature = "async")]
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| crate::Error::Io(std::io::Error::other(e.to_string())))?
}
