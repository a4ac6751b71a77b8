//! In-memory PDF construction for tests.
//!
//! Builds small single-font documents with positioned text and stroked
//! rules, enough to drive text extraction and table detection end to end.
//! Positions are in top-down points on a US Letter page.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const FONT_SIZE: i64 = 10;
const COURIER_WIDTH: i64 = 600;

/// Width of one glyph at the fixture font size, in points.
pub const GLYPH_WIDTH: f64 = 6.0;

/// One page of a fixture document.
#[derive(Debug, Clone, Default)]
pub struct PageBuilder {
    texts: Vec<(i64, i64, String)>,
    rules: Vec<(i64, i64, i64, i64)>,
}

impl PageBuilder {
    /// Starts an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `text` with its top-left corner at (`x`, `top`).
    #[must_use]
    pub fn text(mut self, x: i64, top: i64, text: &str) -> Self {
        self.texts.push((x, top, text.to_string()));
        self
    }

    /// Places each line 14pt below the previous one, starting at `top`.
    #[must_use]
    pub fn lines(mut self, x: i64, top: i64, lines: &[&str]) -> Self {
        for (line, y) in lines.iter().zip((top..).step_by(14)) {
            self = self.text(x, y, line);
        }
        self
    }

    /// Strokes a straight rule between two top-down points.
    #[must_use]
    pub fn rule(mut self, x0: i64, top0: i64, x1: i64, top1: i64) -> Self {
        self.rules.push((x0, top0, x1, top1));
        self
    }

    /// Strokes a full grid: a horizontal rule at every `tops` entry spanning
    /// the outer columns and a vertical rule at every `xs` entry spanning
    /// the outer rows.
    #[must_use]
    pub fn grid(mut self, xs: &[i64], tops: &[i64]) -> Self {
        let (Some(&left), Some(&right)) = (xs.first(), xs.last()) else {
            return self;
        };
        let (Some(&first), Some(&last)) = (tops.first(), tops.last()) else {
            return self;
        };
        for &y in tops {
            self = self.rule(left, y, right, y);
        }
        for &x in xs {
            self = self.rule(x, first, x, last);
        }
        self
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();

        for &(x0, top0, x1, top1) in &self.rules {
            ops.push(Operation::new(
                "m",
                vec![Object::Integer(x0), Object::Integer(PAGE_HEIGHT - top0)],
            ));
            ops.push(Operation::new(
                "l",
                vec![Object::Integer(x1), Object::Integer(PAGE_HEIGHT - top1)],
            ));
            ops.push(Operation::new("S", vec![]));
        }

        for (x, top, text) in &self.texts {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(FONT_SIZE)],
            ));
            ops.push(Operation::new(
                "Td",
                vec![
                    Object::Integer(*x),
                    Object::Integer(PAGE_HEIGHT - top - FONT_SIZE),
                ],
            ));
            ops.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
            ops.push(Operation::new("ET", vec![]));
        }

        ops
    }
}

/// A multi-page fixture document.
#[derive(Debug, Clone, Default)]
pub struct PdfBuilder {
    pages: Vec<PageBuilder>,
}

impl PdfBuilder {
    /// Starts an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page.
    #[must_use]
    pub fn page(mut self, page: PageBuilder) -> Self {
        self.pages.push(page);
        self
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// * If a content stream cannot be encoded or the document cannot be
    ///   written
    pub fn build(&self) -> Result<Vec<u8>, lopdf::Error> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
            "FirstChar" => Object::Integer(32),
            "LastChar" => Object::Integer(126),
            "Widths" => Object::Array(vec![Object::Integer(COURIER_WIDTH); 95]),
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = Content {
                operations: page.operations(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH),
                    Object::Integer(PAGE_HEIGHT),
                ],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
