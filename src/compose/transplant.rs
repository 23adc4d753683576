//! Page transplantation.
//!
//! The original page becomes a Form XObject drawn once on the new canvas
//! with a pure translation. Content bytes, resources and scale are untouched;
//! the original `/Rotate` is set on the new page rather than applied to the
//! content.

use lopdf::content::Operation;
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::backend::{SourceDocument, SourcePage};
use crate::error::{Error, Result};
use crate::model::{Rect, Rotation};
use crate::placement::Placement;

/// A page under construction.
#[derive(Debug, Clone)]
pub struct NewPage {
    /// Zero-based index of the source page
    pub source_index: usize,
    /// New MediaBox, anchored at the origin
    pub media_box: Rect,
    /// Carried from the source page
    pub rotation: Rotation,
    /// Drawing operations, in painting order
    pub operations: Vec<Operation>,
    /// `/XObject` resource entries
    pub xobjects: Dictionary,
}

impl NewPage {
    /// Name under which the transcluded original is registered.
    pub fn form_name(&self) -> String {
        format!("NP{}", self.source_index)
    }

    /// Write the page into `doc` under `parent` and return its id.
    pub fn write(self, doc: &mut LopdfDocument, parent: ObjectId) -> Result<ObjectId> {
        let content = lopdf::content::Content {
            operations: self.operations,
        };
        let encoded = content
            .encode()
            .map_err(|e| Error::Serialization(format!("page {}: {}", self.source_index, e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => self.media_box.to_pdf_box(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => self.xobjects,
            },
        };
        if self.rotation != Rotation::Deg0 {
            page.set("Rotate", self.rotation.degrees());
        }
        Ok(doc.add_object(page))
    }
}

/// Build the new page for `page` according to `placement`.
///
/// The form XObject is added to the source document itself, so the page's
/// resource references stay valid. The source page objects are not modified.
pub fn transplant(
    source: &mut SourceDocument,
    page: &SourcePage,
    placement: &Placement,
) -> Result<NewPage> {
    let content = source.page_content(page)?;

    let mut form = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "FormType" => 1,
        "BBox" => page.bbox.to_pdf_box(),
        "Resources" => page.resources.clone().unwrap_or_else(|| Object::Dictionary(Dictionary::new())),
    };
    if let Some(filter) = content.filter {
        form.set("Filter", filter);
    }
    if let Some(parms) = content.decode_parms {
        form.set("DecodeParms", parms);
    }
    if let Some(group) = page.group.clone() {
        form.set("Group", group);
    }
    let form_id = source.add_object(Stream::new(form, content.bytes));

    let mut new_page = NewPage {
        source_index: page.index,
        media_box: Rect::from_size(placement.canvas),
        rotation: page.rotation,
        operations: Vec::new(),
        xobjects: Dictionary::new(),
    };
    let name = new_page.form_name();
    new_page.xobjects.set(name.clone(), form_id);

    // The form draws in the source page's coordinates, so undo the box origin.
    let dx = placement.content_offset.x - page.bbox.x;
    let dy = placement.content_offset.y - page.bbox.y;
    new_page.operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                Object::Real(dx),
                Object::Real(dy),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.into_bytes())]),
        Operation::new("Q", vec![]),
    ]);

    log::trace!(
        "page {} transplanted at ({}, {}) rotation {}",
        page.index,
        dx,
        dy,
        page.rotation
    );

    Ok(new_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarginConfig, MarginSide, Size};
    use crate::placement::resolve;

    fn one_page_pdf(media_box: [i64; 4], rotate: Option<i64>) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, b"1 0 0 rg 0 0 50 50 re f".to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        };
        if let Some(r) = rotate {
            page.set("Rotate", r);
        }
        let page_id = doc.add_object(page);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn transplant_first(
        data: &[u8],
        placement_for: impl Fn(Size, Rotation) -> Placement,
    ) -> NewPage {
        let mut source = SourceDocument::load_bytes(data).unwrap();
        let page = source.pages().unwrap().remove(0);
        let placement = placement_for(page.size(), page.rotation);
        transplant(&mut source, &page, &placement).unwrap()
    }

    fn translation(page: &NewPage) -> (f32, f32) {
        let cm = page.operations.iter().find(|op| op.operator == "cm").unwrap();
        let e = cm.operands[4].as_float().unwrap();
        let f = cm.operands[5].as_float().unwrap();
        (e, f)
    }

    #[test]
    fn test_identity_transplant_keeps_geometry() {
        let data = one_page_pdf([0, 0, 612, 792], None);
        let page = transplant_first(&data, Placement::identity);
        assert_eq!(page.media_box, Rect::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(translation(&page), (0.0, 0.0));
        assert_eq!(page.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_offset_translation() {
        let data = one_page_pdf([0, 0, 612, 792], None);
        let config = MarginConfig::side(MarginSide::Left, 10.0);
        let page = transplant_first(&data, |size, rot| resolve(size, rot, &config));
        let (dx, dy) = translation(&page);
        assert!((dx - 61.2).abs() < 1e-3);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn test_box_origin_is_compensated() {
        let data = one_page_pdf([100, 50, 712, 842], None);
        let page = transplant_first(&data, Placement::identity);
        assert_eq!(page.media_box, Rect::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(translation(&page), (-100.0, -50.0));
    }

    #[test]
    fn test_rotation_is_carried_not_applied() {
        let data = one_page_pdf([0, 0, 612, 792], Some(90));
        let config = MarginConfig::side(MarginSide::Right, 25.0);
        let page = transplant_first(&data, |size, rot| resolve(size, rot, &config));
        assert_eq!(page.rotation, Rotation::Deg90);
        // Still a pure translation
        let cm = page.operations.iter().find(|op| op.operator == "cm").unwrap();
        assert_eq!(cm.operands[0].as_float().unwrap(), 1.0);
        assert_eq!(cm.operands[1].as_float().unwrap(), 0.0);
        assert_eq!(cm.operands[2].as_float().unwrap(), 0.0);
        assert_eq!(cm.operands[3].as_float().unwrap(), 1.0);
    }

    #[test]
    fn test_form_is_registered() {
        let data = one_page_pdf([0, 0, 612, 792], None);
        let page = transplant_first(&data, Placement::identity);
        assert!(page.xobjects.get(b"NP0").is_ok());
        assert!(page
            .operations
            .iter()
            .any(|op| op.operator == "Do" && op.operands[0].as_name().ok() == Some(&b"NP0"[..])));
    }
}
