//! Color operators.
//!
//! Handles: G, g, RG, rg, K, k, CS, cs, SC, SCN, sc, scn
//!
//! - G/g, RG/rg, K/k: set a device color space and a color in one step
//! - CS/cs: select a color space, possibly through `/ColorSpace` resources
//! - SC/SCN/sc/scn: set a color in the current color space

use lopdf::Object;

use crate::document::objects;
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::{PDFPageInterpreter, nums};
use crate::model::{Color, PDFColorSpace};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    pub(crate) fn do_color(&mut self, op: &str, args: &[Object]) {
        match op {
            "G" | "g" => {
                if let Some([gray]) = nums(args) {
                    self.set_device_color(op == "G", "DeviceGray", Color::Gray(gray));
                }
            }
            "RG" | "rg" => {
                if let Some([r, g, b]) = nums(args) {
                    self.set_device_color(op == "RG", "DeviceRGB", Color::Rgb(r, g, b));
                }
            }
            "K" | "k" => {
                if let Some([c, m, y, k]) = nums(args) {
                    self.set_device_color(op == "K", "DeviceCMYK", Color::Cmyk(c, m, y, k));
                }
            }
            "CS" => {
                if let Some(Object::Name(name)) = args.last() {
                    self.do_CS(&String::from_utf8_lossy(name));
                }
            }
            "cs" => {
                if let Some(Object::Name(name)) = args.last() {
                    self.do_cs(&String::from_utf8_lossy(name));
                }
            }
            "SC" | "SCN" => self.do_SCN(args),
            "sc" | "scn" => self.do_scn(args),
            _ => {}
        }
    }

    fn set_device_color(&mut self, stroking: bool, space: &str, color: Color) {
        let cs = PDFColorSpace::predefined(space);
        if stroking {
            self.graphicstate.scs = cs;
            self.graphicstate.scolor = color;
        } else {
            self.graphicstate.ncs = cs;
            self.graphicstate.ncolor = color;
        }
    }

    /// Sets the stroking color space.
    ///
    /// PDF operator: `CS`
    pub fn do_CS(&mut self, name: &str) {
        let cs = self.lookup_colorspace(name);
        self.graphicstate.scolor = initial_color(&cs);
        self.graphicstate.scs = cs;
    }

    /// Sets the non-stroking color space.
    ///
    /// PDF operator: `cs`
    pub fn do_cs(&mut self, name: &str) {
        let cs = self.lookup_colorspace(name);
        self.graphicstate.ncolor = initial_color(&cs);
        self.graphicstate.ncs = cs;
    }

    /// Sets the stroking color in the current color space.
    ///
    /// PDF operator: `SC` / `SCN`
    pub fn do_SCN(&mut self, args: &[Object]) {
        let n = self.graphicstate.scs.ncomponents;
        if let Some(color) = parse_color(args, n) {
            self.graphicstate.scolor = color;
        }
    }

    /// Sets the non-stroking color in the current color space.
    ///
    /// PDF operator: `sc` / `scn`
    pub fn do_scn(&mut self, args: &[Object]) {
        let n = self.graphicstate.ncs.ncomponents;
        if let Some(color) = parse_color(args, n) {
            self.graphicstate.ncolor = color;
        }
    }

    /// Resolves a color space operand: a device family name or a key into
    /// the `/ColorSpace` resources.
    fn lookup_colorspace(&self, name: &str) -> PDFColorSpace {
        match name {
            "DeviceGray" | "DeviceRGB" | "DeviceCMYK" | "CalGray" | "CalRGB" | "Lab" | "G"
            | "RGB" | "CMYK" => return PDFColorSpace::predefined(name),
            "Pattern" => return PDFColorSpace::new("Pattern", 1),
            _ => {}
        }
        let doc = self.doc;
        let spec = objects::get_dict(doc, &self.resources, b"ColorSpace")
            .and_then(|spaces| objects::get(doc, spaces, name.as_bytes()));
        match spec {
            Some(Object::Name(family)) => {
                PDFColorSpace::predefined(&String::from_utf8_lossy(family))
            }
            Some(Object::Array(arr)) => colorspace_from_array(doc, arr),
            _ => PDFColorSpace::predefined(name),
        }
    }
}

fn colorspace_from_array(doc: &lopdf::Document, arr: &[Object]) -> PDFColorSpace {
    let Some(Object::Name(family)) = arr.first().and_then(|obj| objects::resolve(doc, obj)) else {
        return PDFColorSpace::default();
    };
    let family = String::from_utf8_lossy(family).into_owned();
    let ncomponents = match family.as_str() {
        "ICCBased" => arr
            .get(1)
            .and_then(|obj| objects::resolve(doc, obj))
            .and_then(|obj| obj.as_stream().ok())
            .and_then(|stream| objects::get_num(doc, &stream.dict, b"N"))
            .map_or(1, |n| n as usize),
        "DeviceN" => arr
            .get(1)
            .and_then(|obj| objects::resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map_or(1, Vec::len),
        "Indexed" | "I" | "Separation" | "Pattern" => 1,
        other => PDFColorSpace::predefined(other).ncomponents,
    };
    PDFColorSpace::new(&family, ncomponents)
}

fn initial_color(cs: &PDFColorSpace) -> Color {
    match cs.ncomponents {
        3 => Color::Rgb(0.0, 0.0, 0.0),
        4 => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
        _ => Color::Gray(0.0),
    }
}

/// Color operands for a space with `n` components. A trailing name selects a
/// pattern; numeric operands beyond `n` are ignored.
fn parse_color(args: &[Object], n: usize) -> Option<Color> {
    if let Some(Object::Name(pattern)) = args.last() {
        return Some(Color::Pattern(String::from_utf8_lossy(pattern).into_owned()));
    }
    let values: Vec<f64> = args.iter().filter_map(objects::num).collect();
    let start = values.len().checked_sub(n.max(1))?;
    Color::from_components(&values[start..])
}
