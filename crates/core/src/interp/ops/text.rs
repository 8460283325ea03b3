//! Text operators.
//!
//! Handles: BT, TL, Tf, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! The plain state setters (Tc, Tw, Tz, Tr, Ts) write the text state directly
//! from the dispatcher; ET has no effect since the text state outlives the
//! text object.

use lopdf::Dictionary;
use tracing::debug;

use crate::font::load_font;
use crate::interp::device::{PDFDevice, PDFTextSeq, PDFTextSeqItem};
use crate::interp::interpreter::PDFPageInterpreter;
use crate::utils::Matrix;

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// BT - Begin text object: text matrix and line position return to identity.
    pub fn do_BT(&mut self) {
        self.textstate.reset();
    }

    /// TL - Set text leading. Stored negated so `T*` can add it directly.
    pub fn do_TL(&mut self, leading: f64) {
        self.textstate.leading = -leading;
    }

    /// Tf - Set text font and size.
    ///
    /// A name missing from the font resources gets a default simple font so
    /// the text still advances and decodes as StandardEncoding.
    pub fn do_Tf(&mut self, fontid: &str, fontsize: f64) {
        let font = match self.fontmap.get(fontid) {
            Some(font) => font.clone(),
            None => {
                debug!(font = fontid, "undefined font resource");
                load_font(self.doc, &Dictionary::new())
            }
        };
        self.textstate.font = Some(font);
        self.textstate.fontname = Some(fontid.to_string());
        self.textstate.fontsize = fontsize;
    }

    /// Td - Move to the start of the next line, offset by (tx, ty).
    pub fn do_Td(&mut self, tx: f64, ty: f64) {
        self.textstate.matrix = next_line(self.textstate.matrix, tx, ty);
        self.textstate.linematrix = (0.0, 0.0);
    }

    /// TD - Same as Td, also setting the leading to `ty`.
    pub fn do_TD(&mut self, tx: f64, ty: f64) {
        self.do_Td(tx, ty);
        self.textstate.leading = ty;
    }

    /// Tm - Replace the text matrix.
    pub fn do_Tm(&mut self, matrix: Matrix) {
        self.textstate.matrix = matrix;
        self.textstate.linematrix = (0.0, 0.0);
    }

    /// T* - Move to the next line using the current leading.
    pub fn do_T_star(&mut self) {
        self.textstate.matrix = next_line(self.textstate.matrix, 0.0, self.textstate.leading);
        self.textstate.linematrix = (0.0, 0.0);
    }

    /// TJ - Show strings with positioning adjustments.
    pub fn do_TJ(&mut self, seq: PDFTextSeq) {
        if self.textstate.font.is_none() {
            debug!("text shown with no font selected");
            return;
        }
        self.device
            .render_string(&mut self.textstate, &seq, &self.graphicstate);
    }

    /// Tj - Show a string.
    pub fn do_Tj(&mut self, s: Vec<u8>) {
        self.do_TJ(vec![PDFTextSeqItem::Bytes(s)]);
    }

    /// ' - Move to the next line and show a string.
    pub fn do_quote(&mut self, s: Vec<u8>) {
        self.do_T_star();
        self.do_Tj(s);
    }

    /// " - Set word and character spacing, then behave as `'`.
    pub fn do_doublequote(&mut self, aw: f64, ac: f64, s: Vec<u8>) {
        self.textstate.wordspace = aw;
        self.textstate.charspace = ac;
        self.do_quote(s);
    }
}

fn next_line((a, b, c, d, e, f): Matrix, tx: f64, ty: f64) -> Matrix {
    (a, b, c, d, tx.mul_add(a, ty * c) + e, tx.mul_add(b, ty * d) + f)
}
