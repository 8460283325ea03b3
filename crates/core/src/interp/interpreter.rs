//! Content stream interpreter.
//!
//! `PDFPageInterpreter` decodes a page's content streams with `lopdf`,
//! tracks graphics and text state, and reports drawing events to a
//! `PDFDevice`. `PDFResourceManager` shares parsed fonts across pages.

use std::sync::Arc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::device::{PDFDevice, PDFTextSeqItem, PathSegment};
use crate::document::{PDFPage, objects};
use crate::font::{PDFFont, load_font};
use crate::model::{PDFGraphicState, PDFTextState};
use crate::utils::{MATRIX_IDENTITY, Matrix, Point};

/// Saved graphics state for q/Q operators.
pub(crate) type SavedState = (Matrix, PDFTextState, PDFGraphicState);

/// Shares fonts between pages (and forms) of one document.
#[derive(Debug)]
pub struct PDFResourceManager {
    caching: bool,
    cached_fonts: FxHashMap<ObjectId, Arc<dyn PDFFont>>,
}

impl PDFResourceManager {
    pub fn new() -> Self {
        Self::with_caching(true)
    }

    pub fn with_caching(caching: bool) -> Self {
        Self {
            caching,
            cached_fonts: FxHashMap::default(),
        }
    }

    /// Font for a `/Font` resource, reusing the parsed font for an object id
    /// when caching is on.
    pub fn get_font(
        &mut self,
        doc: &Document,
        objid: Option<ObjectId>,
        spec: &Dictionary,
    ) -> Arc<dyn PDFFont> {
        if self.caching
            && let Some(id) = objid
            && let Some(font) = self.cached_fonts.get(&id)
        {
            return Arc::clone(font);
        }
        let font = load_font(doc, spec);
        if self.caching
            && let Some(id) = objid
        {
            self.cached_fonts.insert(id, Arc::clone(&font));
        }
        font
    }
}

impl Default for PDFResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A piece of a content stream: ordinary operators or one inline image.
#[derive(Debug, PartialEq)]
pub(crate) enum ContentChunk<'d> {
    Operators(&'d [u8]),
    InlineImage { dict: Dictionary, data: Vec<u8> },
}

/// Executes content stream operators against a device.
///
/// Operator handlers live in `interp::ops`, grouped by category.
pub struct PDFPageInterpreter<'a, D: PDFDevice> {
    pub(crate) rsrcmgr: &'a mut PDFResourceManager,
    pub(crate) device: &'a mut D,
    pub(crate) doc: &'a Document,
    pub(crate) gstack: Vec<SavedState>,
    pub(crate) ctm: Matrix,
    pub(crate) textstate: PDFTextState,
    pub(crate) graphicstate: PDFGraphicState,
    pub(crate) curpath: Vec<PathSegment>,
    /// Last point of the current path.
    pub(crate) current_point: Option<Point>,
    pub(crate) fontmap: FxHashMap<String, Arc<dyn PDFFont>>,
    pub(crate) resources: Dictionary,
    /// Form XObjects being rendered, to refuse re-entering one.
    pub(crate) xobj_stack: Vec<String>,
    pub(crate) inline_image_id: usize,
}

impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    pub fn new(rsrcmgr: &'a mut PDFResourceManager, device: &'a mut D, doc: &'a Document) -> Self {
        Self {
            rsrcmgr,
            device,
            doc,
            gstack: Vec::new(),
            ctm: MATRIX_IDENTITY,
            textstate: PDFTextState::new(),
            graphicstate: PDFGraphicState::new(),
            curpath: Vec::new(),
            current_point: None,
            fontmap: FxHashMap::default(),
            resources: Dictionary::new(),
            xobj_stack: Vec::new(),
            inline_image_id: 0,
        }
    }

    pub const fn ctm(&self) -> Matrix {
        self.ctm
    }

    pub const fn textstate(&self) -> &PDFTextState {
        &self.textstate
    }

    pub const fn graphicstate(&self) -> &PDFGraphicState {
        &self.graphicstate
    }

    /// Reset graphics state for a new page or form.
    pub fn init_state(&mut self, ctm: Matrix) {
        self.gstack.clear();
        self.ctm = ctm;
        self.device.set_ctm(ctm);
        self.textstate = PDFTextState::new();
        self.graphicstate = PDFGraphicState::new();
        self.curpath.clear();
        self.current_point = None;
    }

    /// Load the fonts of a resource dictionary and make it current.
    pub fn init_resources(&mut self, resources: Dictionary) {
        self.fontmap.clear();
        let doc = self.doc;
        if let Some(fonts) = objects::get_dict(doc, &resources, b"Font") {
            for (name, obj) in fonts.iter() {
                let objid = match obj {
                    Object::Reference(id) => Some(*id),
                    _ => None,
                };
                let Some(Object::Dictionary(spec)) = objects::resolve(doc, obj) else {
                    debug!(font = %String::from_utf8_lossy(name), "font resource is not a dictionary");
                    continue;
                };
                let font = self.rsrcmgr.get_font(doc, objid, spec);
                self.fontmap
                    .insert(String::from_utf8_lossy(name).into_owned(), font);
            }
        }
        self.resources = resources;
    }

    pub(crate) fn get_current_state(&self) -> SavedState {
        (self.ctm, self.textstate.clone(), self.graphicstate.clone())
    }

    pub(crate) fn set_current_state(&mut self, state: SavedState) {
        let (ctm, textstate, graphicstate) = state;
        self.ctm = ctm;
        self.textstate = textstate;
        self.graphicstate = graphicstate;
        self.device.set_ctm(ctm);
    }

    /// Interpret one page: set up the rotated CTM, then run its content.
    pub fn process_page(&mut self, page: &PDFPage) {
        let (x0, y0, x1, y1) = page.mediabox;
        let ctm = match page.rotate {
            90 => (0.0, -1.0, 1.0, 0.0, -y0, x1),
            180 => (-1.0, 0.0, 0.0, -1.0, x1, y1),
            270 => (0.0, 1.0, -1.0, 0.0, y1, -x0),
            _ => (1.0, 0.0, 0.0, 1.0, -x0, -y0),
        };
        self.device.begin_page(page.pageid, page.mediabox, ctm);
        self.render_contents(page.resources.clone(), &page.contents, ctm);
        self.device.end_page(page.pageid);
    }

    /// Run a content stream with the given resources and initial CTM.
    pub fn render_contents(&mut self, resources: Dictionary, data: &[u8], ctm: Matrix) {
        self.init_resources(resources);
        self.init_state(ctm);
        self.execute(data);
    }

    /// Decode and dispatch every operator in `data`.
    pub fn execute(&mut self, data: &[u8]) {
        for chunk in split_content(data) {
            match chunk {
                ContentChunk::Operators(bytes) => match Content::decode(bytes) {
                    Ok(content) => {
                        for op in &content.operations {
                            self.dispatch_operator(&op.operator, &op.operands);
                        }
                    }
                    Err(err) => debug!(error = ?err, "undecodable content stream segment"),
                },
                ContentChunk::InlineImage { dict, data } => self.do_inline_image(dict, data),
            }
        }
    }

    /// Run one operator. Operators with missing or ill-typed operands are
    /// dropped; unknown operators are ignored.
    #[allow(non_snake_case)]
    fn dispatch_operator(&mut self, op: &str, args: &[Object]) {
        match op {
            // Graphics state
            "q" => self.do_q(),
            "Q" => self.do_Q(),
            "cm" => {
                if let Some([a, b, c, d, e, f]) = nums(args) {
                    self.do_cm((a, b, c, d, e, f));
                }
            }
            "w" => {
                if let Some([w]) = nums(args) {
                    self.do_w(w);
                }
            }
            "d" => {
                if let (Some(Object::Array(arr)), Some([phase])) =
                    (args.len().checked_sub(2).and_then(|i| args.get(i)), nums(args))
                {
                    let dash = arr.iter().filter_map(objects::num).collect();
                    self.do_d(dash, phase);
                }
            }
            "gs" => {
                if let Some(name) = last_name(args) {
                    self.do_gs(&name);
                }
            }
            "J" | "j" | "M" | "ri" | "i" => {}

            // Color
            "G" | "g" | "RG" | "rg" | "K" | "k" | "CS" | "cs" | "SC" | "SCN" | "sc" | "scn" => {
                self.do_color(op, args);
            }

            // Path construction
            "m" => {
                if let Some([x, y]) = nums(args) {
                    self.do_m(x, y);
                }
            }
            "l" => {
                if let Some([x, y]) = nums(args) {
                    self.do_l(x, y);
                }
            }
            "c" => {
                if let Some([x1, y1, x2, y2, x3, y3]) = nums(args) {
                    self.do_c(x1, y1, x2, y2, x3, y3);
                }
            }
            "v" => {
                if let Some([x2, y2, x3, y3]) = nums(args) {
                    self.do_v(x2, y2, x3, y3);
                }
            }
            "y" => {
                if let Some([x1, y1, x3, y3]) = nums(args) {
                    self.do_y(x1, y1, x3, y3);
                }
            }
            "h" => self.do_h(),
            "re" => {
                if let Some([x, y, w, h]) = nums(args) {
                    self.do_re(x, y, w, h);
                }
            }

            // Path painting
            "S" => self.do_S(),
            "s" => self.do_s(),
            "f" | "F" => self.do_f(),
            "f*" => self.do_f_star(),
            "B" => self.do_B(),
            "B*" => self.do_B_star(),
            "b" => self.do_b(),
            "b*" => self.do_b_star(),
            "n" => self.do_n(),
            "W" | "W*" => {}

            // Text objects and state
            "BT" => self.do_BT(),
            "ET" => {}
            "Tc" => {
                if let Some([v]) = nums(args) {
                    self.textstate.charspace = v;
                }
            }
            "Tw" => {
                if let Some([v]) = nums(args) {
                    self.textstate.wordspace = v;
                }
            }
            "Tz" => {
                if let Some([v]) = nums(args) {
                    self.textstate.scaling = v;
                }
            }
            "TL" => {
                if let Some([v]) = nums(args) {
                    self.do_TL(v);
                }
            }
            "Tf" => {
                if let (Some(name), Some([size])) = (
                    args.len().checked_sub(2).and_then(|i| args.get(i)).and_then(name_of),
                    nums(args),
                ) {
                    self.do_Tf(&name, size);
                }
            }
            "Tr" => {
                if let Some([v]) = nums(args) {
                    self.textstate.render = v as i32;
                }
            }
            "Ts" => {
                if let Some([v]) = nums(args) {
                    self.textstate.rise = v;
                }
            }

            // Text positioning
            "Td" => {
                if let Some([tx, ty]) = nums(args) {
                    self.do_Td(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = nums(args) {
                    self.do_TD(tx, ty);
                }
            }
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = nums(args) {
                    self.do_Tm((a, b, c, d, e, f));
                }
            }
            "T*" => self.do_T_star(),

            // Text showing
            "Tj" => {
                if let Some(s) = last_string(args) {
                    self.do_Tj(s);
                }
            }
            "TJ" => {
                if let Some(Object::Array(arr)) = args.last() {
                    self.do_TJ(text_seq(arr));
                }
            }
            "'" => {
                if let Some(s) = last_string(args) {
                    self.do_quote(s);
                }
            }
            "\"" => {
                if let (Some(s), Some([aw, ac])) =
                    (last_string(args), args.split_last().and_then(|(_, rest)| nums(rest)))
                {
                    self.do_doublequote(aw, ac, s);
                }
            }

            // XObjects
            "Do" => {
                if let Some(name) = last_name(args) {
                    self.do_Do(&name);
                }
            }

            // Marked content, compatibility sections, Type3 glyph metrics, shading
            "BMC" | "BDC" | "EMC" | "MP" | "DP" | "BX" | "EX" | "d0" | "d1" | "sh" => {}

            other => debug!(operator = other, "unknown operator"),
        }
    }
}

/// Last `N` operands as numbers (operators read their operands from the end).
pub(crate) fn nums<const N: usize>(args: &[Object]) -> Option<[f64; N]> {
    let start = args.len().checked_sub(N)?;
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(&args[start..]) {
        *slot = objects::num(obj)?;
    }
    Some(out)
}

fn name_of(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

pub(crate) fn last_name(args: &[Object]) -> Option<String> {
    args.last().and_then(name_of)
}

fn last_string(args: &[Object]) -> Option<Vec<u8>> {
    match args.last()? {
        Object::String(bytes, _) => Some(bytes.clone()),
        _ => None,
    }
}

fn text_seq(arr: &[Object]) -> Vec<PDFTextSeqItem> {
    arr.iter()
        .filter_map(|obj| match obj {
            Object::String(bytes, _) => Some(PDFTextSeqItem::Bytes(bytes.clone())),
            other => objects::num(other).map(PDFTextSeqItem::Number),
        })
        .collect()
}

/// Inline image dictionary keys and their full names.
const INLINE_KEYS: &[(&[u8], &[u8])] = &[
    (b"BPC", b"BitsPerComponent"),
    (b"CS", b"ColorSpace"),
    (b"D", b"Decode"),
    (b"DP", b"DecodeParms"),
    (b"F", b"Filter"),
    (b"H", b"Height"),
    (b"IM", b"ImageMask"),
    (b"I", b"Interpolate"),
    (b"W", b"Width"),
];

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0')
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Split content into operator runs and inline images.
///
/// `lopdf` cannot tokenize the binary payload of `BI ... ID ... EI`, so inline
/// images are cut out here and the text around them is decoded separately.
pub(crate) fn split_content(data: &[u8]) -> Vec<ContentChunk<'_>> {
    let mut chunks = Vec::new();
    let mut last = 0;
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'(' => i = skip_literal_string(data, i),
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'<' => {
                i = data[i..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| i + p + 1);
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'B' if data[i..].starts_with(b"BI")
                && (i == 0 || is_whitespace(data[i - 1]) || matches!(data[i - 1], b')' | b'>' | b']'))
                && data.get(i + 2).is_none_or(|&b| is_whitespace(b) || b == b'/') =>
            {
                let Some((dict, payload, end)) = parse_inline_image(data, i + 2) else {
                    // No ID/EI: treat the rest as ordinary content.
                    break;
                };
                if last < i {
                    chunks.push(ContentChunk::Operators(&data[last..i]));
                }
                chunks.push(ContentChunk::InlineImage { dict, data: payload });
                i = end;
                last = end;
            }
            _ => i += 1,
        }
    }
    if last < data.len() {
        chunks.push(ContentChunk::Operators(&data[last..]));
    }
    chunks
}

fn skip_literal_string(data: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    data.len()
}

/// Parse an inline image starting right after `BI`. Returns the dictionary,
/// the raw payload and the offset just past `EI`.
fn parse_inline_image(data: &[u8], start: usize) -> Option<(Dictionary, Vec<u8>, usize)> {
    let mut dict = Dictionary::new();
    let mut pos = start;
    let mut key: Option<Vec<u8>> = None;
    loop {
        while pos < data.len() && is_whitespace(data[pos]) {
            pos += 1;
        }
        if pos >= data.len() {
            return None;
        }
        if data[pos..].starts_with(b"ID") && data.get(pos + 2).is_none_or(|&b| is_whitespace(b)) {
            pos += 2;
            break;
        }
        let (value, next) = parse_inline_value(data, pos)?;
        pos = next;
        match key.take() {
            None => match value {
                Object::Name(name) => key = Some(name),
                _ => return None,
            },
            Some(k) => {
                let full = INLINE_KEYS
                    .iter()
                    .find(|(abbr, _)| *abbr == k.as_slice())
                    .map_or(k.clone(), |(_, full)| full.to_vec());
                dict.set(full, value);
            }
        }
    }
    // A single whitespace byte separates ID from the payload.
    if data.get(pos).is_some_and(|&b| is_whitespace(b)) {
        pos += 1;
    }
    let payload_start = pos;
    let mut i = pos;
    while i + 2 <= data.len() {
        if data[i..].starts_with(b"EI")
            && (i == payload_start || is_whitespace(data[i - 1]))
            && data.get(i + 2).is_none_or(|&b| is_whitespace(b))
        {
            let payload_end = if i > payload_start { i - 1 } else { i };
            return Some((dict, data[payload_start..payload_end].to_vec(), i + 2));
        }
        i += 1;
    }
    None
}

/// One direct object inside an inline image dictionary.
fn parse_inline_value(data: &[u8], start: usize) -> Option<(Object, usize)> {
    match data[start] {
        b'/' => {
            let end = token_end(data, start + 1);
            Some((Object::Name(data[start + 1..end].to_vec()), end))
        }
        b'[' => {
            let mut items = Vec::new();
            let mut pos = start + 1;
            loop {
                while pos < data.len() && is_whitespace(data[pos]) {
                    pos += 1;
                }
                match data.get(pos)? {
                    b']' => return Some((Object::Array(items), pos + 1)),
                    _ => {
                        let (item, next) = parse_inline_value(data, pos)?;
                        items.push(item);
                        pos = next;
                    }
                }
            }
        }
        _ => {
            let end = token_end(data, start);
            if end == start {
                return None;
            }
            let word = std::str::from_utf8(&data[start..end]).ok()?;
            let obj = match word {
                "true" => Object::Boolean(true),
                "false" => Object::Boolean(false),
                _ if word.contains('.') => Object::from(word.parse::<f64>().ok()?),
                _ => Object::Integer(word.parse::<i64>().ok()?),
            };
            Some((obj, end))
        }
    }
}

fn token_end(data: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < data.len() && !is_whitespace(data[end]) && !is_delimiter(data[end]) {
        end += 1;
    }
    end
}

/// Build a stream object for an inline image.
pub(crate) fn inline_stream(dict: Dictionary, data: Vec<u8>) -> Stream {
    Stream::new(dict, data)
}
