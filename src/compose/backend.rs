//! Source document access.
//!
//! Wraps a loaded `lopdf::Document` and answers the questions the composer
//! needs per page: effective box, rotation, resources and content bytes,
//! with page-tree inheritance resolved.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::Serialize;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{Rect, Rotation, Size};

/// Page-tree nesting we are willing to follow before assuming a cycle.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// A page as read from the source document.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Zero-based position in the document
    pub index: usize,
    /// Object id of the page dictionary
    pub id: ObjectId,
    /// Effective visible box (CropBox clipped to MediaBox)
    pub bbox: Rect,
    /// Normalised `/Rotate`
    pub rotation: Rotation,
    /// `/Resources`, possibly inherited; a reference is kept as a reference
    pub resources: Option<Object>,
    /// Page-level transparency group
    pub group: Option<Object>,
}

impl SourcePage {
    /// Size of the visible box.
    pub fn size(&self) -> Size {
        self.bbox.size()
    }
}

/// Serializable summary of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    /// Zero-based position in the document
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub rotation: Rotation,
}

/// Serializable summary of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    /// PDF version from the file header
    pub version: String,
    pub page_count: usize,
    pub pages: Vec<PageInfo>,
}

/// A loaded source document.
pub struct SourceDocument {
    doc: LopdfDocument,
}

impl SourceDocument {
    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            // Reading from memory only fails this way on truncated input
            lopdf::Error::IO(io) => Error::DocumentLoad(io.to_string()),
            other => Error::from(other),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        if doc.catalog().is_err() {
            return Err(Error::DocumentLoad("document has no catalog".to_string()));
        }

        Ok(Self { doc })
    }

    /// Give up the wrapper and return the document for composition.
    pub fn into_inner(self) -> LopdfDocument {
        self.doc
    }

    /// Add a new object alongside the source objects. Existing objects,
    /// the source pages included, are left as they are.
    pub(crate) fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Page object ids in document order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Read the page at `index` whose dictionary is `id`.
    pub fn page(&self, index: usize, id: ObjectId) -> Result<SourcePage> {
        let dict = self
            .doc
            .get_dictionary(id)
            .map_err(|e| Error::transplant(index, format!("page dictionary: {}", e)))?;

        let media = match self.inherited(dict, b"MediaBox") {
            Some(obj) => self
                .read_box(obj)
                .ok_or_else(|| Error::transplant(index, "malformed /MediaBox"))?,
            None => Rect::from_size(Size::letter()),
        };

        let bbox = match self.inherited(dict, b"CropBox") {
            Some(obj) => {
                let crop = self
                    .read_box(obj)
                    .ok_or_else(|| Error::transplant(index, "malformed /CropBox"))?;
                crop.intersection(&media)
                    .ok_or_else(|| Error::transplant(index, "/CropBox lies outside /MediaBox"))?
            }
            None => media,
        };

        if bbox.is_empty() {
            return Err(Error::transplant(index, "page box has no area"));
        }

        let rotation = match self.inherited(dict, b"Rotate") {
            Some(obj) => {
                // Some producers write the angle as a real, e.g. 90.0
                let degrees = get_number(self.resolve(obj))
                    .filter(|d| d.fract() == 0.0)
                    .map(|d| d as i64)
                    .ok_or_else(|| Error::transplant(index, "non-integer /Rotate"))?;
                Rotation::from_degrees(degrees).ok_or_else(|| {
                    Error::transplant(index, format!("/Rotate {} is not a multiple of 90", degrees))
                })?
            }
            None => Rotation::Deg0,
        };

        Ok(SourcePage {
            index,
            id,
            bbox,
            rotation,
            resources: self.inherited(dict, b"Resources").cloned(),
            group: dict.get(b"Group").ok().cloned(),
        })
    }

    /// Read every page in order.
    pub fn pages(&self) -> Result<Vec<SourcePage>> {
        self.page_ids()
            .into_iter()
            .enumerate()
            .map(|(index, id)| self.page(index, id))
            .collect()
    }

    /// Summarise the document.
    pub fn info(&self) -> Result<DocumentInfo> {
        let pages: Vec<PageInfo> = self
            .pages()?
            .into_iter()
            .map(|p| PageInfo {
                index: p.index,
                width: p.bbox.width,
                height: p.bbox.height,
                rotation: p.rotation,
            })
            .collect();
        Ok(DocumentInfo {
            version: self.version(),
            page_count: pages.len(),
            pages,
        })
    }

    /// Content of a page, ready to become a single form stream.
    ///
    /// A lone content stream is returned as stored, with its filter entries,
    /// so it is carried without re-encoding. Several streams are decoded and
    /// joined with newlines.
    pub fn page_content(&self, page: &SourcePage) -> Result<PageContent> {
        let dict = self
            .doc
            .get_dictionary(page.id)
            .map_err(|e| Error::transplant(page.index, e.to_string()))?;

        let contents = match dict.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(PageContent::empty()),
        };

        match self.resolve(contents) {
            Object::Stream(stream) => Ok(PageContent {
                filter: stream.dict.get(b"Filter").ok().cloned(),
                decode_parms: stream.dict.get(b"DecodeParms").ok().cloned(),
                bytes: stream.content.clone(),
            }),
            Object::Array(parts) => {
                let mut bytes = Vec::new();
                for part in parts {
                    let stream = self.resolve(part).as_stream().map_err(|_| {
                        Error::transplant(page.index, "content array entry is not a stream")
                    })?;
                    bytes.extend_from_slice(&decoded_stream(stream, page.index)?);
                    bytes.push(b'\n');
                }
                Ok(PageContent {
                    bytes,
                    filter: None,
                    decode_parms: None,
                })
            }
            Object::Null => Ok(PageContent::empty()),
            _ => Err(Error::transplant(page.index, "invalid /Contents entry")),
        }
    }

    /// Look up `key` on the page or the nearest ancestor that defines it.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Follow a reference, or return the object itself. Dangling references resolve to `Null`.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(&Object::Null),
            other => other,
        }
    }

    fn read_box(&self, obj: &Object) -> Option<Rect> {
        let arr = self.resolve(obj).as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let mut v = [0.0f32; 4];
        for (slot, item) in v.iter_mut().zip(arr) {
            *slot = get_number(self.resolve(item))?;
        }
        Some(Rect::from_corners(v[0], v[1], v[2], v[3]))
    }
}

/// Raw content for one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub bytes: Vec<u8>,
    /// `/Filter` to carry onto the form, when the bytes are still encoded
    pub filter: Option<Object>,
    pub decode_parms: Option<Object>,
}

impl PageContent {
    fn empty() -> Self {
        Self::default()
    }
}

fn decoded_stream(stream: &lopdf::Stream, page_index: usize) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::transplant(page_index, format!("undecodable content stream: {}", e)))
}

/// Helper: extract a number from a PDF object.
pub fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
