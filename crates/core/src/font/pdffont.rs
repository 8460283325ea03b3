//! PDF fonts: code decoding, Unicode mapping and glyph metrics.

use std::fmt;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::cmap::UnicodeMap;
use super::encoding::{BaseEncoding, name_to_unicode};
use crate::document::objects;

/// Glyph space to text space for everything except Type3 fonts.
const GLYPH_SCALE: f64 = 0.001;

/// Width used when a simple font has neither `/Widths` nor `/MissingWidth`.
const FALLBACK_SIMPLE_WIDTH: f64 = 500.0;

/// Width map: CID -> width in glyph units.
pub type FontWidthDict = FxHashMap<u32, f64>;

/// Character displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharDisp {
    /// Horizontal advance in text-space units.
    Horizontal(f64),
    /// Vertical writing: the glyph's position vector (vx, vy) in glyph units.
    /// `None` for vx means half the font size.
    Vertical(Option<f64>, f64),
}

/// Base interface for all font types.
pub trait PDFFont: fmt::Debug + Send + Sync {
    fn fontname(&self) -> &str;

    fn is_vertical(&self) -> bool {
        false
    }

    fn is_multibyte(&self) -> bool {
        false
    }

    /// Split a shown string into character codes.
    fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        bytes.iter().map(|&b| u32::from(b)).collect()
    }

    /// Unicode text for a code, `None` when the font gives no mapping.
    fn to_unichr(&self, cid: u32) -> Option<String>;

    /// Advance width in text-space units (per 1pt of font size).
    fn char_width(&self, cid: u32) -> f64;

    fn char_disp(&self, cid: u32) -> CharDisp {
        CharDisp::Horizontal(self.char_width(cid))
    }

    /// Descent below the baseline, per 1pt of font size (negative).
    fn get_descent(&self) -> f64 {
        -0.25
    }
}

/// Build the font described by a `/Font` resource dictionary.
pub fn load_font(doc: &Document, spec: &Dictionary) -> Arc<dyn PDFFont> {
    match objects::get_name(doc, spec, b"Subtype").as_deref() {
        Some("Type0") => Arc::new(PDFCIDFont::new(doc, spec)),
        Some("Type1" | "MMType1" | "TrueType" | "Type3") => Arc::new(PDFSimpleFont::new(doc, spec)),
        other => {
            debug!(subtype = ?other, "unknown font subtype, treating as simple font");
            Arc::new(PDFSimpleFont::new(doc, spec))
        }
    }
}

fn read_tounicode(doc: &Document, spec: &Dictionary) -> Option<UnicodeMap> {
    let stream = objects::get_stream(doc, spec, b"ToUnicode")?;
    let data = objects::stream_data(stream).ok()?;
    let map = UnicodeMap::parse(&data);
    (!map.is_empty()).then_some(map)
}

fn read_descent(doc: &Document, descriptor: Option<&Dictionary>, vscale: f64) -> f64 {
    descriptor
        .and_then(|d| objects::get_num(doc, d, b"Descent"))
        .filter(|d| *d != 0.0)
        .map_or(-0.25, |d| d * vscale)
}

/// One-byte font: Type1, TrueType or Type3.
#[derive(Debug)]
pub struct PDFSimpleFont {
    fontname: String,
    cid2unicode: FxHashMap<u8, String>,
    tounicode: Option<UnicodeMap>,
    widths: FontWidthDict,
    default_width: f64,
    hscale: f64,
    descent: f64,
}

impl PDFSimpleFont {
    pub fn new(doc: &Document, spec: &Dictionary) -> Self {
        let fontname = objects::get_name(doc, spec, b"BaseFont").unwrap_or_else(|| "unknown".into());
        let descriptor = objects::get_dict(doc, spec, b"FontDescriptor");

        // Type3 glyph space is given by /FontMatrix instead of the 1/1000 convention.
        let (hscale, vscale) = match objects::get_array(doc, spec, b"FontMatrix")
            .and_then(|arr| objects::num_array(doc, arr))
            .as_deref()
        {
            Some([a, b, c, d, ..]) => (a + c, b + d),
            _ => (GLYPH_SCALE, GLYPH_SCALE),
        };

        let widths = Self::read_widths(doc, spec);
        let default_width = descriptor
            .and_then(|d| objects::get_num(doc, d, b"MissingWidth"))
            .unwrap_or(if widths.is_empty() { FALLBACK_SIMPLE_WIDTH } else { 0.0 });

        Self {
            fontname,
            cid2unicode: Self::read_encoding(doc, spec),
            tounicode: read_tounicode(doc, spec),
            widths,
            default_width,
            hscale,
            descent: read_descent(doc, descriptor, vscale.abs()),
        }
    }

    fn read_widths(doc: &Document, spec: &Dictionary) -> FontWidthDict {
        let first_char = objects::get_num(doc, spec, b"FirstChar").unwrap_or(0.0) as u32;
        let Some(arr) = objects::get_array(doc, spec, b"Widths") else {
            return FontWidthDict::default();
        };
        arr.iter()
            .enumerate()
            .filter_map(|(i, obj)| {
                let w = objects::resolve(doc, obj).and_then(objects::num)?;
                Some((first_char + i as u32, w))
            })
            .collect()
    }

    /// Base encoding plus `/Differences`.
    fn read_encoding(doc: &Document, spec: &Dictionary) -> FxHashMap<u8, String> {
        let (base, differences) = match objects::get(doc, spec, b"Encoding") {
            Some(Object::Name(name)) => (
                BaseEncoding::from_name(&String::from_utf8_lossy(name)).unwrap_or_default(),
                None,
            ),
            Some(Object::Dictionary(dict)) => (
                objects::get_name(doc, dict, b"BaseEncoding")
                    .and_then(|n| BaseEncoding::from_name(&n))
                    .unwrap_or_default(),
                objects::get_array(doc, dict, b"Differences"),
            ),
            _ => (BaseEncoding::default(), None),
        };

        let mut table = base.table();
        let mut code: Option<u32> = None;
        for item in differences.unwrap_or_default() {
            match objects::resolve(doc, item) {
                Some(Object::Integer(n)) => code = u32::try_from(*n).ok(),
                Some(Object::Name(name)) => {
                    if let Some(c) = code {
                        if let (Ok(byte), Some(text)) =
                            (u8::try_from(c), name_to_unicode(&String::from_utf8_lossy(name)))
                        {
                            table.insert(byte, text);
                        }
                        code = Some(c + 1);
                    }
                }
                _ => {}
            }
        }
        table
    }
}

impl PDFFont for PDFSimpleFont {
    fn fontname(&self) -> &str {
        &self.fontname
    }

    fn to_unichr(&self, cid: u32) -> Option<String> {
        if let Some(text) = self.tounicode.as_ref().and_then(|m| m.get_unichr(cid)) {
            return Some(text.to_string());
        }
        u8::try_from(cid)
            .ok()
            .and_then(|code| self.cid2unicode.get(&code))
            .cloned()
    }

    fn char_width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width) * self.hscale
    }

    fn get_descent(&self) -> f64 {
        self.descent
    }
}

/// Composite (Type0) font with a CID-keyed descendant.
#[derive(Debug)]
pub struct PDFCIDFont {
    fontname: String,
    vertical: bool,
    code_len: usize,
    tounicode: Option<UnicodeMap>,
    /// `/ToUnicode /Identity-H`: CIDs are Unicode code points.
    identity_unicode: bool,
    widths: FontWidthDict,
    default_width: f64,
    /// Vertical advances (`w1y`), glyph units.
    vwidths: FontWidthDict,
    default_vwidth: f64,
    disps: FxHashMap<u32, (Option<f64>, f64)>,
    default_disp: (Option<f64>, f64),
    descent: f64,
}

impl PDFCIDFont {
    pub fn new(doc: &Document, spec: &Dictionary) -> Self {
        let fontname = objects::get_name(doc, spec, b"BaseFont").unwrap_or_else(|| "unknown".into());

        let (vertical, code_len) = match objects::get(doc, spec, b"Encoding") {
            Some(Object::Name(name)) => {
                let name = String::from_utf8_lossy(name);
                (name.ends_with("-V"), 2)
            }
            Some(Object::Stream(stream)) => {
                let wmode = objects::get_num(doc, &stream.dict, b"WMode").unwrap_or(0.0);
                let code_len = objects::stream_data(stream)
                    .ok()
                    .and_then(|data| UnicodeMap::parse(&data).code_len())
                    .filter(|n| (1..=4).contains(n))
                    .unwrap_or(2);
                (wmode == 1.0, code_len)
            }
            _ => (false, 2),
        };

        let descendant = objects::get_array(doc, spec, b"DescendantFonts")
            .and_then(|arr| arr.first())
            .and_then(|obj| objects::resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());
        let empty = Dictionary::new();
        let cidfont = descendant.unwrap_or(&empty);
        let descriptor = objects::get_dict(doc, cidfont, b"FontDescriptor");

        let identity_unicode = matches!(
            objects::get(doc, spec, b"ToUnicode"),
            Some(Object::Name(n)) if n.starts_with(b"Identity")
        );

        let widths = objects::get_array(doc, cidfont, b"W")
            .map(|arr| parse_cid_widths(doc, arr))
            .unwrap_or_default();
        let default_width = objects::get_num(doc, cidfont, b"DW").unwrap_or(1000.0);

        let (default_vy, default_vwidth) = match objects::get_array(doc, cidfont, b"DW2")
            .and_then(|arr| objects::num_array(doc, arr))
            .as_deref()
        {
            Some([vy, w1y, ..]) => (*vy, *w1y),
            _ => (880.0, -1000.0),
        };
        let metrics = objects::get_array(doc, cidfont, b"W2")
            .map(|arr| parse_vertical_metrics(doc, arr))
            .unwrap_or_default();
        let vwidths = metrics.iter().map(|(&cid, &(w1y, _, _))| (cid, w1y)).collect();
        let disps = metrics.into_iter().map(|(cid, (_, vx, vy))| (cid, (Some(vx), vy))).collect();

        Self {
            fontname,
            vertical,
            code_len,
            tounicode: read_tounicode(doc, spec),
            identity_unicode,
            widths,
            default_width,
            vwidths,
            default_vwidth,
            disps,
            default_disp: (None, default_vy),
            descent: read_descent(doc, descriptor, GLYPH_SCALE),
        }
    }
}

impl PDFFont for PDFCIDFont {
    fn fontname(&self) -> &str {
        &self.fontname
    }

    fn is_vertical(&self) -> bool {
        self.vertical
    }

    fn is_multibyte(&self) -> bool {
        self.code_len > 1
    }

    fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(self.code_len)
            .map(|chunk| chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
            .collect()
    }

    fn to_unichr(&self, cid: u32) -> Option<String> {
        if let Some(text) = self.tounicode.as_ref().and_then(|m| m.get_unichr(cid)) {
            return Some(text.to_string());
        }
        if self.identity_unicode {
            return char::from_u32(cid).map(String::from);
        }
        None
    }

    fn char_width(&self, cid: u32) -> f64 {
        if self.vertical {
            return self.vwidths.get(&cid).copied().unwrap_or(self.default_vwidth) * GLYPH_SCALE;
        }
        self.widths.get(&cid).copied().unwrap_or(self.default_width) * GLYPH_SCALE
    }

    fn char_disp(&self, cid: u32) -> CharDisp {
        if self.vertical {
            let (vx, vy) = self.disps.get(&cid).copied().unwrap_or(self.default_disp);
            CharDisp::Vertical(vx, vy)
        } else {
            CharDisp::Horizontal(self.char_width(cid))
        }
    }

    fn get_descent(&self) -> f64 {
        self.descent
    }
}

/// Parse a CIDFont `/W` array.
///
/// Entries are either `c [w1 w2 ...]` (consecutive CIDs from `c`) or
/// `cfirst clast w` (one width for the whole range).
pub fn parse_cid_widths(doc: &Document, seq: &[Object]) -> FontWidthDict {
    let mut widths = FontWidthDict::default();
    let mut pending: Vec<f64> = Vec::new();
    for item in seq {
        match objects::resolve(doc, item) {
            Some(Object::Array(arr)) => {
                if let Some(first) = pending.pop() {
                    let first = first as u32;
                    for (i, w) in arr.iter().enumerate() {
                        if let Some(w) = objects::resolve(doc, w).and_then(objects::num) {
                            widths.insert(first + i as u32, w);
                        }
                    }
                }
                pending.clear();
            }
            Some(obj) => {
                if let Some(n) = objects::num(obj) {
                    pending.push(n);
                    if let [first, last, w] = pending[..] {
                        for cid in (first as u32)..=(last as u32).min(first as u32 + 0xFFFF) {
                            widths.insert(cid, w);
                        }
                        pending.clear();
                    }
                }
            }
            None => {}
        }
    }
    widths
}

/// Parse a CIDFont `/W2` array into `(w1y, vx, vy)` per CID, in glyph units.
///
/// Entries are `c [w1y v1x v1y ...]` or `cfirst clast w1y v1x v1y`.
fn parse_vertical_metrics(doc: &Document, seq: &[Object]) -> FxHashMap<u32, (f64, f64, f64)> {
    let mut metrics = FxHashMap::default();
    let mut pending: Vec<f64> = Vec::new();
    for item in seq {
        match objects::resolve(doc, item) {
            Some(Object::Array(arr)) => {
                if let (Some(first), Some(values)) = (pending.pop(), objects::num_array(doc, arr)) {
                    for (i, triple) in values.chunks_exact(3).enumerate() {
                        metrics.insert(first as u32 + i as u32, (triple[0], triple[1], triple[2]));
                    }
                }
                pending.clear();
            }
            Some(obj) => {
                if let Some(n) = objects::num(obj) {
                    pending.push(n);
                    if let [first, last, w1y, vx, vy] = pending[..] {
                        for cid in (first as u32)..=(last as u32).min(first as u32 + 0xFFFF) {
                            metrics.insert(cid, (w1y, vx, vy));
                        }
                        pending.clear();
                    }
                }
            }
            None => {}
        }
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_simple_font_widths_and_encoding() {
        let doc = Document::with_version("1.5");
        let spec = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(667), Object::Integer(667)],
            "Encoding" => dictionary! {
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![Object::Integer(66), Object::Name(b"eacute".to_vec())],
            },
        };
        let font = load_font(&doc, &spec);
        assert_eq!(font.fontname(), "Helvetica");
        assert_eq!(font.decode(b"AB"), vec![65, 66]);
        assert_eq!(font.to_unichr(65).as_deref(), Some("A"));
        assert_eq!(font.to_unichr(66).as_deref(), Some("é"));
        assert!((font.char_width(65) - 0.667).abs() < 1e-9);
        // Outside /Widths with no /MissingWidth.
        assert_eq!(font.char_width(90), 0.0);
    }

    #[test]
    fn test_simple_font_without_widths() {
        let doc = Document::with_version("1.5");
        let spec = dictionary! { "Subtype" => "Type1", "BaseFont" => "Courier" };
        let font = load_font(&doc, &spec);
        assert!((font.char_width(65) - 0.5).abs() < 1e-9);
        assert_eq!(font.get_descent(), -0.25);
    }

    #[test]
    fn test_cid_font_two_byte_codes() {
        let doc = Document::with_version("1.5");
        let spec = dictionary! {
            "Subtype" => "Type0",
            "BaseFont" => "Mincho",
            "Encoding" => "Identity-H",
            "ToUnicode" => "Identity-H",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Subtype" => "CIDFontType2",
                "DW" => 1000,
                "W" => vec![
                    Object::Integer(65),
                    Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
                    Object::Integer(100),
                    Object::Integer(102),
                    Object::Integer(250),
                ],
            })],
        };
        let font = load_font(&doc, &spec);
        assert!(font.is_multibyte());
        assert!(!font.is_vertical());
        assert_eq!(font.decode(&[0x00, 0x41, 0x00, 0x42, 0x01]), vec![0x41, 0x42]);
        assert_eq!(font.to_unichr(0x41).as_deref(), Some("A"));
        assert!((font.char_width(66) - 0.6).abs() < 1e-9);
        assert!((font.char_width(101) - 0.25).abs() < 1e-9);
        assert!((font.char_width(7) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cid_font_vertical() {
        let doc = Document::with_version("1.5");
        let spec = dictionary! {
            "Subtype" => "Type0",
            "Encoding" => "Identity-V",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {})],
        };
        let font = load_font(&doc, &spec);
        assert!(font.is_vertical());
        assert_eq!(font.char_disp(1), CharDisp::Vertical(None, 880.0));
        assert!((font.char_width(1) + 1.0).abs() < 1e-9);
        assert_eq!(font.to_unichr(1), None);
    }

    #[test]
    fn test_cid_font_vertical_metrics() {
        let doc = Document::with_version("1.5");
        let spec = dictionary! {
            "Subtype" => "Type0",
            "Encoding" => "Identity-V",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "W2" => vec![
                    Object::Integer(5),
                    Object::Array(vec![
                        Object::Integer(-500),
                        Object::Integer(400),
                        Object::Integer(800),
                    ]),
                    Object::Integer(10),
                    Object::Integer(11),
                    Object::Integer(-900),
                    Object::Integer(450),
                    Object::Integer(820),
                ],
            })],
        };
        let font = load_font(&doc, &spec);
        assert!((font.char_width(5) + 0.5).abs() < 1e-9);
        assert_eq!(font.char_disp(5), CharDisp::Vertical(Some(400.0), 800.0));
        assert!((font.char_width(11) + 0.9).abs() < 1e-9);
        assert_eq!(font.char_disp(10), CharDisp::Vertical(Some(450.0), 820.0));
        // Outside /W2 the /DW2 defaults apply.
        assert_eq!(font.char_disp(6), CharDisp::Vertical(None, 880.0));
    }
}
