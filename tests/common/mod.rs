//! Shared fixtures: synthetic PDFs built with lopdf, and readers for the
//! documents the engine writes.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const EPS: f32 = 1e-2;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

/// How a synthetic page stores its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLayout {
    /// One unfiltered stream with the page text
    Plain,
    /// One FlateDecode stream: page text, then [`rule_lines`]
    Compressed,
    /// A `/Contents` array: [`rule_lines`] compressed, then the page text unfiltered
    Split,
    /// No `/Contents` entry
    Missing,
}

/// One page of a synthetic document.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub media_box: [f32; 4],
    pub crop_box: Option<[f32; 4]>,
    pub rotate: Option<i64>,
    pub text: String,
    pub contents: ContentLayout,
    pub group: bool,
    pub annotated: bool,
}

impl PageSpec {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            media_box: [0.0, 0.0, width, height],
            crop_box: None,
            rotate: None,
            text: String::new(),
            contents: ContentLayout::Plain,
            group: false,
            annotated: false,
        }
    }

    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        let w = self.media_box[2] - self.media_box[0];
        let h = self.media_box[3] - self.media_box[1];
        self.media_box = [x, y, x + w, y + h];
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_contents(mut self, layout: ContentLayout) -> Self {
        self.contents = layout;
        self
    }

    pub fn with_crop_box(mut self, crop_box: [f32; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    /// Page-level transparency group.
    pub fn with_group(mut self) -> Self {
        self.group = true;
        self
    }

    /// A link annotation on the page and an outline entry pointing at it.
    pub fn with_annotation(mut self) -> Self {
        self.annotated = true;
        self
    }
}

/// Forty stroked segments; long enough that lopdf agrees to compress them.
pub fn rule_lines() -> String {
    (0..40)
        .map(|i| format!("0 {} m 100 {} l S\n", i * 10, i * 10))
        .collect()
}

fn compressed_stream(content: Vec<u8>) -> Stream {
    let mut stream = Stream::new(dictionary! {}, content);
    stream.compress().unwrap();
    assert!(stream.dict.get(b"Filter").is_ok(), "fixture stream stayed uncompressed");
    stream
}

/// Build a PDF whose page `i` draws the string `(page i+1)` unless a text
/// is given.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    let mut outline_targets = Vec::new();
    for (i, spec) in pages.iter().enumerate() {
        let text = if spec.text.is_empty() {
            format!("page {}", i + 1)
        } else {
            spec.text.clone()
        };
        let x = spec.media_box[0] + 72.0;
        let y = spec.media_box[3] - 72.0;
        let text_ops = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .unwrap();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => spec.media_box.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        match spec.contents {
            ContentLayout::Plain => {
                let id = doc.add_object(Stream::new(dictionary! {}, text_ops));
                page.set("Contents", id);
            }
            ContentLayout::Compressed => {
                let mut body = text_ops;
                body.push(b'\n');
                body.extend_from_slice(rule_lines().as_bytes());
                let id = doc.add_object(compressed_stream(body));
                page.set("Contents", id);
            }
            ContentLayout::Split => {
                let rules = doc.add_object(compressed_stream(rule_lines().into_bytes()));
                let text = doc.add_object(Stream::new(dictionary! {}, text_ops));
                page.set("Contents", vec![rules.into(), text.into()]);
            }
            ContentLayout::Missing => {}
        }
        if let Some(crop) = spec.crop_box {
            page.set("CropBox", crop.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>());
        }
        if let Some(rotate) = spec.rotate {
            page.set("Rotate", rotate);
        }
        if spec.group {
            page.set(
                "Group",
                dictionary! {
                    "Type" => "Group",
                    "S" => "Transparency",
                    "CS" => "DeviceRGB",
                },
            );
        }

        let page_id = doc.new_object_id();
        if spec.annotated {
            let annot = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![72.into(), 72.into(), 144.into(), 90.into()],
                "P" => page_id,
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::string_literal("https://example.com"),
                },
            });
            page.set("Annots", vec![annot.into()]);
            outline_targets.push(page_id);
        }
        doc.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
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
    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(&target) = outline_targets.first() {
        let outlines_id = doc.new_object_id();
        let item_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Chapter 1"),
            "Parent" => outlines_id,
            "Dest" => vec![target.into(), "Fit".into()],
        });
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => item_id,
                "Last" => item_id,
                "Count" => 1,
            }),
        );
        catalog.set("Outlines", outlines_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Lecture 4"),
    });
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// `n` US Letter pages.
pub fn letter_pdf(n: usize) -> Vec<u8> {
    build_pdf(&vec![PageSpec::letter(); n])
}

/// A page of an output document, decoded for assertions.
#[derive(Debug)]
pub struct OutputPage {
    pub media_box: [f32; 4],
    pub rotate: i64,
    pub operations: Vec<Operation>,
    pub form_bbox: [f32; 4],
    /// Decoded form content
    pub form_content: Vec<u8>,
    /// Form content as stored in the file
    pub form_raw: Vec<u8>,
    pub form_filter: Option<Object>,
    pub form_group: Option<Object>,
    pub annotated: bool,
}

impl OutputPage {
    pub fn width(&self) -> f32 {
        self.media_box[2] - self.media_box[0]
    }

    pub fn height(&self) -> f32 {
        self.media_box[3] - self.media_box[1]
    }

    /// Translation applied to the transcluded page.
    pub fn translation(&self) -> (f32, f32) {
        let cm = self
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .expect("page has no cm operator");
        (
            cm.operands[4].as_float().unwrap(),
            cm.operands[5].as_float().unwrap(),
        )
    }

    /// Rectangles filled or clipped after the transcluded page is drawn.
    pub fn margin_rects(&self) -> Vec<[f32; 4]> {
        self.operations
            .iter()
            .skip_while(|op| op.operator != "Do")
            .filter(|op| op.operator == "re")
            .map(|op| {
                let v: Vec<f32> = op.operands.iter().map(|o| o.as_float().unwrap()).collect();
                [v[0], v[1], v[2], v[3]]
            })
            .collect()
    }

    pub fn count(&self, operator: &str) -> usize {
        self.operations
            .iter()
            .filter(|op| op.operator == operator)
            .count()
    }

    pub fn form_text(&self) -> String {
        String::from_utf8_lossy(&self.form_content).into_owned()
    }
}

fn numbers(obj: &Object) -> [f32; 4] {
    let v: Vec<f32> = obj
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect();
    [v[0], v[1], v[2], v[3]]
}

fn stream_bytes(stream: &Stream) -> Vec<u8> {
    if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content().unwrap()
    } else {
        stream.content.clone()
    }
}

fn read_page(doc: &Document, id: ObjectId) -> OutputPage {
    let dict = doc.get_dictionary(id).unwrap();
    let media_box = numbers(dict.get(b"MediaBox").unwrap());
    let rotate = dict.get(b"Rotate").and_then(Object::as_i64).unwrap_or(0);

    let content = doc.get_page_content(id).unwrap();
    let operations = Content::decode(&content).unwrap().operations;

    let resources = dict.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let (_, form_ref) = xobjects.iter().next().expect("page has no form");
    let form = doc
        .get_object(form_ref.as_reference().unwrap())
        .unwrap()
        .as_stream()
        .unwrap();

    OutputPage {
        media_box,
        rotate,
        operations,
        form_bbox: numbers(form.dict.get(b"BBox").unwrap()),
        form_content: stream_bytes(form),
        form_raw: form.content.clone(),
        form_filter: form.dict.get(b"Filter").ok().cloned(),
        form_group: form.dict.get(b"Group").ok().cloned(),
        annotated: dict.has(b"Annots"),
    }
}

/// Load an output document and decode every page, in order.
pub fn read_pages(bytes: &[u8]) -> Vec<OutputPage> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| read_page(&doc, id))
        .collect()
}

/// Raw bytes and filter of the first page's single content stream.
pub fn source_content_stream(bytes: &[u8]) -> (Vec<u8>, Option<Object>) {
    let doc = Document::load_mem(bytes).unwrap();
    let page = *doc.get_pages().values().next().unwrap();
    let contents = doc.get_dictionary(page).unwrap().get(b"Contents").unwrap();
    let stream = doc
        .get_object(contents.as_reference().unwrap())
        .unwrap()
        .as_stream()
        .unwrap();
    (stream.content.clone(), stream.dict.get(b"Filter").ok().cloned())
}

/// `/Type` names of every dictionary and stream in a document.
pub fn object_types(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.objects
        .values()
        .filter_map(|obj| match obj {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        })
        .filter_map(|dict| dict.get(b"Type").and_then(Object::as_name_str).ok())
        .map(str::to_string)
        .collect()
}
