//! Graphics state operators.
//!
//! Handles: q, Q, cm, w, d, gs
//!
//! Line cap, join, miter limit, rendering intent and flatness do not affect
//! extracted geometry and are accepted without effect.

use lopdf::Object;
use tracing::debug;

use crate::document::objects;
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::PDFPageInterpreter;
use crate::utils::{Matrix, mult_matrix};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// Saves the current graphics state to the stack.
    ///
    /// PDF operator: `q`
    pub fn do_q(&mut self) {
        self.gstack.push(self.get_current_state());
    }

    /// Restores the graphics state from the stack. An unmatched `Q` is ignored.
    ///
    /// PDF operator: `Q`
    pub fn do_Q(&mut self) {
        if let Some(state) = self.gstack.pop() {
            self.set_current_state(state);
        }
    }

    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn do_cm(&mut self, matrix: Matrix) {
        self.ctm = mult_matrix(matrix, self.ctm);
        self.device.set_ctm(self.ctm);
    }

    /// PDF operator: `w`
    pub fn do_w(&mut self, linewidth: f64) {
        self.graphicstate.linewidth = linewidth;
    }

    /// PDF operator: `d`
    pub fn do_d(&mut self, dash_array: Vec<f64>, phase: f64) {
        self.graphicstate.dash = Some((dash_array, phase));
    }

    /// Applies line width and dash pattern from an `/ExtGState` resource.
    ///
    /// PDF operator: `gs`
    pub fn do_gs(&mut self, name: &str) {
        let doc = self.doc;
        let Some(extgstate) = objects::get_dict(doc, &self.resources, b"ExtGState")
            .and_then(|states| objects::get_dict(doc, states, name.as_bytes()))
        else {
            debug!(name, "undefined ExtGState");
            return;
        };
        if let Some(lw) = objects::get_num(doc, extgstate, b"LW") {
            self.graphicstate.linewidth = lw;
        }
        if let Some([Object::Array(dash), phase]) = objects::get_array(doc, extgstate, b"D")
            && let Some(phase) = objects::num(phase)
        {
            let dash = dash.iter().filter_map(objects::num).collect();
            self.graphicstate.dash = Some((dash, phase));
        }
    }
}
