//! XObject operators and inline images.
//!
//! Handles: Do, BI/ID/EI
//!
//! - Form XObjects run their content inside a figure, under the form matrix.
//! - Image XObjects and inline images become a unit-square figure holding
//!   one image.

use std::mem;

use lopdf::{Dictionary, Object, Stream};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::document::objects;
use crate::font::PDFFont;
use crate::interp::device::{PDFDevice, PathSegment};
use crate::interp::interpreter::{PDFPageInterpreter, SavedState, inline_stream};
use crate::model::{PDFGraphicState, PDFTextState};
use crate::utils::{MATRIX_IDENTITY, Matrix, Point, mult_matrix};

/// Forms nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 32;

/// Interpreter state set aside while a form XObject runs.
pub(crate) struct InterpreterState {
    gstack: Vec<SavedState>,
    ctm: Matrix,
    textstate: PDFTextState,
    graphicstate: PDFGraphicState,
    curpath: Vec<PathSegment>,
    current_point: Option<Point>,
    fontmap: FxHashMap<String, std::sync::Arc<dyn PDFFont>>,
    resources: Dictionary,
}

/// Inline image color space and filter abbreviations.
const INLINE_VALUES: &[(&[u8], &[u8])] = &[
    (b"G", b"DeviceGray"),
    (b"RGB", b"DeviceRGB"),
    (b"CMYK", b"DeviceCMYK"),
    (b"I", b"Indexed"),
    (b"AHx", b"ASCIIHexDecode"),
    (b"A85", b"ASCII85Decode"),
    (b"LZW", b"LZWDecode"),
    (b"Fl", b"FlateDecode"),
    (b"RL", b"RunLengthDecode"),
    (b"CCF", b"CCITTFaxDecode"),
    (b"DCT", b"DCTDecode"),
];

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// Do - Invoke a named XObject.
    pub fn do_Do(&mut self, xobjid: &str) {
        let doc = self.doc;
        let Some(xobj) = objects::get_dict(doc, &self.resources, b"XObject")
            .and_then(|xobjects| objects::get_stream(doc, xobjects, xobjid.as_bytes()))
            .cloned()
        else {
            debug!(xobject = xobjid, "undefined XObject");
            return;
        };
        match objects::get_name(doc, &xobj.dict, b"Subtype").as_deref() {
            Some("Form") => self.render_form(xobjid, &xobj),
            Some("Image")
                if xobj.dict.has(b"Width") && xobj.dict.has(b"Height") =>
            {
                self.device
                    .begin_figure(xobjid, (0.0, 0.0, 1.0, 1.0), MATRIX_IDENTITY);
                self.device.render_image(xobjid, &xobj);
                self.device.end_figure(xobjid);
            }
            other => debug!(xobject = xobjid, subtype = ?other, "unsupported XObject"),
        }
    }

    fn render_form(&mut self, xobjid: &str, xobj: &Stream) {
        if self.xobj_stack.iter().any(|id| id == xobjid) || self.xobj_stack.len() >= MAX_FORM_DEPTH {
            debug!(xobject = xobjid, depth = self.xobj_stack.len(), "skipping nested form");
            return;
        }
        let doc = self.doc;
        let Some(bbox) = xobj.dict.get(b"BBox").ok().and_then(|obj| objects::rect(doc, obj))
        else {
            debug!(xobject = xobjid, "form without BBox");
            return;
        };
        let matrix = objects::get_array(doc, &xobj.dict, b"Matrix")
            .and_then(|arr| objects::num_array(doc, arr))
            .and_then(|m| match m[..] {
                [a, b, c, d, e, f] => Some((a, b, c, d, e, f)),
                _ => None,
            })
            .unwrap_or(MATRIX_IDENTITY);
        let resources = objects::get_dict(doc, &xobj.dict, b"Resources")
            .cloned()
            .unwrap_or_else(|| self.resources.clone());
        let data = match objects::stream_data(xobj) {
            Ok(data) => data,
            Err(err) => {
                debug!(xobject = xobjid, error = %err, "undecodable form content");
                return;
            }
        };

        let saved = self.snapshot_state();
        self.xobj_stack.push(xobjid.to_string());
        self.device.begin_figure(xobjid, bbox, matrix);
        let form_ctm = mult_matrix(matrix, saved.ctm);
        self.render_contents(resources, &data, form_ctm);
        self.device.end_figure(xobjid);
        self.xobj_stack.pop();
        self.restore_state(saved);
    }

    /// BI ... ID ... EI - an image embedded in the content stream.
    pub(crate) fn do_inline_image(&mut self, mut dict: Dictionary, data: Vec<u8>) {
        for key in [b"ColorSpace".as_slice(), b"Filter".as_slice()] {
            if let Ok(value) = dict.get_mut(key) {
                expand_abbreviations(value);
            }
        }
        if !dict.has(b"Width") || !dict.has(b"Height") {
            debug!("inline image without dimensions");
            return;
        }
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        let name = format!("inline{}", self.inline_image_id);
        self.inline_image_id += 1;
        let stream = inline_stream(dict, data);
        self.device
            .begin_figure(&name, (0.0, 0.0, 1.0, 1.0), MATRIX_IDENTITY);
        self.device.render_image(&name, &stream);
        self.device.end_figure(&name);
    }

    pub(crate) fn snapshot_state(&mut self) -> InterpreterState {
        InterpreterState {
            gstack: mem::take(&mut self.gstack),
            ctm: self.ctm,
            textstate: self.textstate.clone(),
            graphicstate: self.graphicstate.clone(),
            curpath: mem::take(&mut self.curpath),
            current_point: self.current_point,
            fontmap: mem::take(&mut self.fontmap),
            resources: mem::take(&mut self.resources),
        }
    }

    pub(crate) fn restore_state(&mut self, state: InterpreterState) {
        self.gstack = state.gstack;
        self.ctm = state.ctm;
        self.device.set_ctm(self.ctm);
        self.textstate = state.textstate;
        self.graphicstate = state.graphicstate;
        self.curpath = state.curpath;
        self.current_point = state.current_point;
        self.fontmap = state.fontmap;
        self.resources = state.resources;
    }
}

fn expand_abbreviations(value: &mut Object) {
    match value {
        Object::Name(name) => {
            if let Some((_, full)) = INLINE_VALUES.iter().find(|(abbr, _)| *abbr == name.as_slice()) {
                *name = full.to_vec();
            }
        }
        Object::Array(items) => items.iter_mut().for_each(expand_abbreviations),
        _ => {}
    }
}
