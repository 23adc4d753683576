//! Document assembly: drives placement, transplantation and painting over
//! a page range and serializes the result.

use lopdf::{dictionary, Dictionary, Object, ObjectId};

use super::backend::SourceDocument;
use super::options::{AssembleMode, AssembleOptions, PagePolicy};
use super::painter::paint;
use super::transplant::{transplant, NewPage};
use crate::error::{Error, Result};
use crate::model::{FillSpec, MarginConfig};
use crate::placement::{resolve, Placement};

/// Output of one assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Serialized output document
    pub bytes: Vec<u8>,
    /// Page count of the source document
    pub total_pages: usize,
    /// Pages in the output document
    pub pages_written: usize,
    /// Pages left out under [`PagePolicy::Skip`], with the reason
    pub skipped: Vec<(usize, String)>,
}

/// Assemble a new document from `data`.
///
/// With `margins` set to `None` every page is transplanted unchanged, which
/// gives the unmodified comparison document used by previews. Configuration
/// is validated before the document is loaded.
pub fn assemble(
    data: &[u8],
    margins: Option<&MarginConfig>,
    fill: &FillSpec,
    mode: AssembleMode,
    options: &AssembleOptions,
) -> Result<Assembly> {
    if let Some(config) = margins {
        config.validate()?;
        fill.validate()?;
    }

    let mut source = SourceDocument::load_bytes(data)?;
    let page_ids = source.page_ids();
    let total_pages = page_ids.len();
    let limit = mode.page_limit(total_pages);
    log::debug!(
        "assembling {} of {} pages ({:?}, margins: {})",
        limit,
        total_pages,
        mode,
        margins.is_some()
    );

    let mut pages = Vec::with_capacity(limit);
    let mut skipped = Vec::new();
    for (index, id) in page_ids.into_iter().take(limit).enumerate() {
        if options.is_cancelled() {
            log::debug!("cancelled after {} pages", index);
            return Err(Error::Cancelled { pages_done: index });
        }

        match build_page(&mut source, index, id, margins, fill) {
            Ok(page) => pages.push(page),
            Err(Error::PageTransplant { page_index, reason })
                if options.policy == PagePolicy::Skip =>
            {
                log::warn!("skipping page {}: {}", page_index, reason);
                skipped.push((page_index, reason));
            }
            Err(e) => return Err(e),
        }
        options.report_progress(index + 1, limit);
    }

    let pages_written = pages.len();
    let bytes = write_document(source, pages, options.compress)?;
    log::debug!("wrote {} pages, {} bytes", pages_written, bytes.len());

    Ok(Assembly {
        bytes,
        total_pages,
        pages_written,
        skipped,
    })
}

fn build_page(
    source: &mut SourceDocument,
    index: usize,
    id: ObjectId,
    margins: Option<&MarginConfig>,
    fill: &FillSpec,
) -> Result<NewPage> {
    let page = source.page(index, id)?;
    let placement = match margins {
        Some(config) => resolve(page.size(), page.rotation, config),
        None => Placement::identity(page.size(), page.rotation),
    };
    debug_assert!(placement.tiles_canvas(1e-2), "{:?}", placement);

    let mut new_page = transplant(source, &page, &placement)?;
    paint(&mut new_page, &placement.margin_rects(), fill);
    Ok(new_page)
}

/// Replace the page tree with `pages` and serialize.
fn write_document(source: SourceDocument, pages: Vec<NewPage>, compress: bool) -> Result<Vec<u8>> {
    let mut doc = source.into_inner();

    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        kids.push(Object::Reference(page.write(&mut doc, pages_id)?));
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    // Fresh trailer: only the new catalog and the document info survive.
    let info = doc.trailer.get(b"Info").ok().cloned();
    doc.trailer = Dictionary::new();
    doc.trailer.set("Root", catalog_id);
    if let Some(info) = info {
        doc.trailer.set("Info", info);
    }

    doc.prune_objects();
    doc.renumber_objects();
    if compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(bytes)
}
