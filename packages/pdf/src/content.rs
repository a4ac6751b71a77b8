//! Page content-stream interpretation.
//!
//! Walks a page's operators (and any form `XObject`s it draws) tracking the
//! graphics and text state needed to place two kinds of objects in top-down
//! page coordinates:
//!
//! - [`Char`]s: every shown glyph with its bounding box, and
//! - [`Edge`]s: the axis-aligned segments of every painted path.
//!
//! Colours, clipping and images are ignored.

use std::collections::BTreeMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::PdfError;
use crate::font::Font;
use crate::geometry::{BBox, Edge, Matrix};

/// Form `XObject`s nested deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 8;
/// Page size used when no `MediaBox` is found anywhere up the page tree.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// One shown glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    /// Decoded text (usually one character; ligatures may carry more).
    pub text: String,
    /// Bounding box in top-down page coordinates.
    pub bbox: BBox,
}

impl Char {
    /// Whether the glyph renders as whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Everything table detection needs from one page.
#[derive(Debug, Clone, Default)]
pub struct PageObjects {
    /// Glyphs in content-stream order.
    pub chars: Vec<Char>,
    /// Painted axis-aligned segments in content-stream order.
    pub edges: Vec<Edge>,
}

/// Follows indirect references to the underlying object.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..16 {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Reads a numeric operand.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        #[allow(clippy::cast_precision_loss)]
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Looks up a page attribute, walking the `Parent` chain for inherited
/// entries.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        node = dictionary(doc, node.get(b"Parent").ok()?)?;
    }
    None
}

fn media_box(doc: &Document, page: &Dictionary) -> [f64; 4] {
    let Some(Object::Array(items)) = inherited(doc, page, b"MediaBox") else {
        return DEFAULT_MEDIA_BOX;
    };
    let values: Vec<f64> = items
        .iter()
        .filter_map(|item| resolve(doc, item).and_then(number))
        .collect();

    match values.as_slice() {
        [x0, y0, x1, y1] => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// Interprets one page (1-based `page_number`).
///
/// # Errors
///
/// * [`PdfError::PageNotFound`] if the document has no such page
/// * [`PdfError::Content`] if the page's content stream cannot be read or
///   decoded
pub fn page_objects(doc: &Document, page_number: u32) -> Result<PageObjects, PdfError> {
    let page_id = doc
        .get_pages()
        .get(&page_number)
        .copied()
        .ok_or(PdfError::PageNotFound(page_number))?;

    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfError::Content {
            page: page_number,
            message: format!("page dictionary unreadable: {e}"),
        })?;

    let data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Content {
            page: page_number,
            message: format!("content stream unreadable: {e}"),
        })?;
    let content = Content::decode(&data).map_err(|e| PdfError::Content {
        page: page_number,
        message: format!("content stream undecodable: {e}"),
    })?;

    let [mb_x0, _, _, mb_y1] = media_box(doc, page);
    let resources = inherited(doc, page, b"Resources").and_then(|obj| dictionary(doc, obj));

    let mut interpreter = Interpreter {
        doc,
        page_number,
        origin_x: mb_x0,
        origin_top: mb_y1,
        fonts: BTreeMap::new(),
        objects: PageObjects::default(),
    };
    interpreter.run(&content, resources, GraphicsState::new(Matrix::IDENTITY), 0);

    log::debug!(
        "page {page_number}: {} chars, {} edges",
        interpreter.objects.chars.len(),
        interpreter.objects.edges.len()
    );

    Ok(interpreter.objects)
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Rc<Font>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font: Rc::new(Font::default()),
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

type Segment = ((f64, f64), (f64, f64));

#[derive(Debug, Default)]
struct Path {
    segments: Vec<Segment>,
    start: Option<(f64, f64)>,
    current: Option<(f64, f64)>,
}

impl Path {
    fn move_to(&mut self, p: (f64, f64)) {
        self.start = Some(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: (f64, f64)) {
        if let Some(from) = self.current {
            self.segments.push((from, p));
        } else {
            self.start = Some(p);
        }
        self.current = Some(p);
    }

    fn curve_to(&mut self, p: (f64, f64)) {
        if self.current.is_none() {
            self.start = Some(p);
        }
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let (Some(from), Some(to)) = (self.current, self.start) {
            if from != to {
                self.segments.push((from, to));
            }
            self.current = Some(to);
        }
    }

    fn take(&mut self) -> Vec<Segment> {
        self.start = None;
        self.current = None;
        std::mem::take(&mut self.segments)
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    page_number: u32,
    origin_x: f64,
    origin_top: f64,
    fonts: BTreeMap<ObjectId, Rc<Font>>,
    objects: PageObjects,
}

impl Interpreter<'_> {
    fn to_page(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x - self.origin_x, self.origin_top - y)
    }

    #[allow(clippy::too_many_lines)]
    fn run(
        &mut self,
        content: &Content,
        resources: Option<&Dictionary>,
        mut gs: GraphicsState,
        depth: usize,
    ) {
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = Path::default();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in &content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(number).unwrap_or(0.0);

            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    let m = Matrix::new(num(0), num(1), num(2), num(3), num(4), num(5));
                    gs.ctm = m.then(&gs.ctm);
                }

                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    gs.font_size = num(1);
                    if let Some(Object::Name(name)) = operands.first() {
                        gs.font = self.font(resources, name);
                    }
                }
                "Tc" => gs.char_spacing = num(0),
                "Tw" => gs.word_spacing = num(0),
                "Tz" => gs.horizontal_scaling = num(0) / 100.0,
                "TL" => gs.leading = num(0),
                "Ts" => gs.rise = num(0),

                "Td" => {
                    tlm = Matrix::translate(num(0), num(1)).then(&tlm);
                    tm = tlm;
                }
                "TD" => {
                    gs.leading = -num(1);
                    tlm = Matrix::translate(num(0), num(1)).then(&tlm);
                    tm = tlm;
                }
                "Tm" => {
                    tlm = Matrix::new(num(0), num(1), num(2), num(3), num(4), num(5));
                    tm = tlm;
                }
                "T*" => {
                    tlm = Matrix::translate(0.0, -gs.leading).then(&tlm);
                    tm = tlm;
                }

                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "'" => {
                    tlm = Matrix::translate(0.0, -gs.leading).then(&tlm);
                    tm = tlm;
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "\"" => {
                    gs.word_spacing = num(0);
                    gs.char_spacing = num(1);
                    tlm = Matrix::translate(0.0, -gs.leading).then(&tlm);
                    tm = tlm;
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(&gs, &mut tm, bytes),
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * gs.font_size
                                            * gs.horizontal_scaling;
                                        tm = Matrix::translate(tx, 0.0).then(&tm);
                                    }
                                }
                            }
                        }
                    }
                }

                "m" => path.move_to(gs.ctm.apply(num(0), num(1))),
                "l" => path.line_to(gs.ctm.apply(num(0), num(1))),
                "c" => path.curve_to(gs.ctm.apply(num(4), num(5))),
                "v" | "y" => path.curve_to(gs.ctm.apply(num(2), num(3))),
                "re" => {
                    let (x, y, w, h) = (num(0), num(1), num(2), num(3));
                    path.move_to(gs.ctm.apply(x, y));
                    path.line_to(gs.ctm.apply(x + w, y));
                    path.line_to(gs.ctm.apply(x + w, y + h));
                    path.line_to(gs.ctm.apply(x, y + h));
                    path.close();
                }
                "h" => path.close(),

                "S" => self.paint(path.take()),
                "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    path.close();
                    self.paint(path.take());
                }
                "n" => {
                    path.take();
                }

                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_xobject(resources, name, &gs, depth);
                    }
                }

                _ => {}
            }
        }
    }

    fn font(&mut self, resources: Option<&Dictionary>, name: &[u8]) -> Rc<Font> {
        let entry = resources
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|fonts| dictionary(self.doc, fonts))
            .and_then(|fonts| fonts.get(name).ok());

        let Some(entry) = entry else {
            log::warn!(
                "page {}: font /{} not found in resources",
                self.page_number,
                String::from_utf8_lossy(name)
            );
            return Rc::new(Font::default());
        };

        if let Object::Reference(id) = entry {
            if let Some(font) = self.fonts.get(id) {
                return Rc::clone(font);
            }
        }

        let font = dictionary(self.doc, entry)
            .map_or_else(Font::default, |dict| Font::load(self.doc, dict));
        let font = Rc::new(font);

        if let Object::Reference(id) = entry {
            self.fonts.insert(*id, Rc::clone(&font));
        }

        font
    }

    fn show(&mut self, gs: &GraphicsState, tm: &mut Matrix, bytes: &[u8]) {
        let fs = gs.font_size;
        let th = gs.horizontal_scaling;
        let scale = Matrix::new(fs * th, 0.0, 0.0, fs, 0.0, gs.rise);

        for glyph in gs.font.decode(bytes) {
            let trm = scale.then(tm).then(&gs.ctm);
            let w = glyph.width / 1000.0;

            if !glyph.text.is_empty() {
                let corners = [(0.0, 0.0), (w, 0.0), (0.0, 1.0), (w, 1.0)]
                    .map(|(x, y)| self.to_page(trm.apply(x, y)));
                let x0 = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
                let x1 = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
                let top = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
                let bottom = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

                self.objects.chars.push(Char {
                    text: glyph.text,
                    bbox: BBox::new(x0, top, x1, bottom),
                });
            }

            let spacing = if glyph.is_word_space {
                gs.char_spacing + gs.word_spacing
            } else {
                gs.char_spacing
            };
            let tx = w.mul_add(fs, spacing) * th;
            *tm = Matrix::translate(tx, 0.0).then(tm);
        }
    }

    fn paint(&mut self, segments: Vec<Segment>) {
        for (p0, p1) in segments {
            if let Some(edge) = Edge::from_points(self.to_page(p0), self.to_page(p1)) {
                self.objects.edges.push(edge);
            }
        }
    }

    fn draw_xobject(
        &mut self,
        resources: Option<&Dictionary>,
        name: &[u8],
        gs: &GraphicsState,
        depth: usize,
    ) {
        let doc = self.doc;
        let stream = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|xobjects| dictionary(doc, xobjects))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(stream),
                _ => None,
            });

        let Some(stream) = stream else {
            return;
        };
        if !matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(kind)) if kind == b"Form") {
            return;
        }
        if depth >= MAX_FORM_DEPTH {
            log::warn!(
                "page {}: skipping form /{} nested too deeply",
                self.page_number,
                String::from_utf8_lossy(name)
            );
            return;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!(
                    "page {}: skipping undecodable form /{}: {e}",
                    self.page_number,
                    String::from_utf8_lossy(name)
                );
                return;
            }
        };

        let matrix = match stream.dict.get(b"Matrix").ok().and_then(|m| resolve(doc, m)) {
            Some(Object::Array(items)) if items.len() == 6 => {
                let v: Vec<f64> = items.iter().map(|i| number(i).unwrap_or(0.0)).collect();
                Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5])
            }
            _ => Matrix::IDENTITY,
        };
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| dictionary(doc, obj))
            .or(resources);

        let mut form_gs = gs.clone();
        form_gs.ctm = matrix.then(&gs.ctm);
        self.run(&content, form_resources, form_gs, depth + 1);
    }
}
