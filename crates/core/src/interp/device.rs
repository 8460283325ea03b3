//! Output devices for page interpretation.
//!
//! The interpreter drives a `PDFDevice` with page, figure, path, image and
//! text events. `PDFTextDevice` adds the glyph-by-glyph walk over shown
//! strings that layout-building devices share.

use std::sync::Arc;

use lopdf::Stream;

use crate::font::PDFFont;
use crate::model::{PDFColorSpace, PDFGraphicState, PDFTextState};
use crate::utils::{Matrix, Point, Rect, mult_matrix, translate_matrix};

/// Sequence of shown strings and positioning adjustments (a `TJ` array).
pub type PDFTextSeq = Vec<PDFTextSeqItem>;

#[derive(Debug, Clone, PartialEq)]
pub enum PDFTextSeqItem {
    /// Adjustment in thousandths of text space, subtracted from the cursor.
    Number(f64),
    /// Encoded character codes.
    Bytes(Vec<u8>),
}

/// One path construction operator with its operands in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// `c`: two control points and the end point.
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// `v`: the current point is the first control point.
    CurveV(f64, f64, f64, f64),
    /// `y`: the end point is the second control point.
    CurveY(f64, f64, f64, f64),
    ClosePath,
}

impl PathSegment {
    /// Operator letter used in path signatures.
    pub fn op(&self) -> char {
        match self {
            PathSegment::MoveTo(..) => 'm',
            PathSegment::LineTo(..) => 'l',
            PathSegment::CurveTo(..) => 'c',
            PathSegment::CurveV(..) => 'v',
            PathSegment::CurveY(..) => 'y',
            PathSegment::ClosePath => 'h',
        }
    }

    /// Terminal point of the operator; `None` for closepath.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => Some((x, y)),
            PathSegment::CurveTo(_, _, _, _, x, y)
            | PathSegment::CurveV(_, _, x, y)
            | PathSegment::CurveY(_, _, x, y) => Some((x, y)),
            PathSegment::ClosePath => None,
        }
    }
}

/// Receiver of interpretation events. Every method defaults to a no-op.
pub trait PDFDevice {
    fn set_ctm(&mut self, ctm: Matrix);

    fn ctm(&self) -> Matrix;

    fn begin_page(&mut self, _pageid: u32, _mediabox: Rect, _ctm: Matrix) {}

    fn end_page(&mut self, _pageid: u32) {}

    /// Begin a form XObject or image placement.
    fn begin_figure(&mut self, _name: &str, _bbox: Rect, _matrix: Matrix) {}

    fn end_figure(&mut self, _name: &str) {}

    fn paint_path(
        &mut self,
        _graphicstate: &PDFGraphicState,
        _stroke: bool,
        _fill: bool,
        _evenodd: bool,
        _path: &[PathSegment],
    ) {
    }

    /// Render an image XObject or inline image. Always called inside a figure.
    fn render_image(&mut self, _name: &str, _stream: &Stream) {}

    /// Show text. Devices update `textstate.linematrix` to the final cursor.
    fn render_string(
        &mut self,
        _textstate: &mut PDFTextState,
        _seq: &PDFTextSeq,
        _graphicstate: &PDFGraphicState,
    ) {
    }
}

/// Device that lays out individual glyphs.
///
/// Implementors supply `render_char`; `render_text` walks a shown string,
/// applying character, word and `TJ` spacing, and is meant to back
/// `PDFDevice::render_string`.
pub trait PDFTextDevice: PDFDevice {
    /// Place one glyph and return its advance in text space.
    #[allow(clippy::too_many_arguments)]
    fn render_char(
        &mut self,
        matrix: Matrix,
        font: &Arc<dyn PDFFont>,
        fontsize: f64,
        scaling: f64,
        rise: f64,
        cid: u32,
        ncs: &PDFColorSpace,
        graphicstate: &PDFGraphicState,
    ) -> f64;

    fn render_text(
        &mut self,
        textstate: &mut PDFTextState,
        seq: &PDFTextSeq,
        graphicstate: &PDFGraphicState,
    ) {
        let Some(font) = textstate.font.clone() else {
            return;
        };
        let matrix = mult_matrix(textstate.matrix, self.ctm());
        let run = TextRun {
            matrix,
            fontsize: textstate.fontsize,
            scaling: textstate.scaling * 0.01,
            charspace: textstate.charspace * textstate.scaling * 0.01,
            wordspace: if font.is_multibyte() {
                0.0
            } else {
                textstate.wordspace * textstate.scaling * 0.01
            },
            rise: textstate.rise,
            visible: textstate.is_visible(),
        };
        textstate.linematrix =
            self.render_run(&run, seq, textstate.linematrix, &font, graphicstate);
    }

    #[doc(hidden)]
    fn render_run(
        &mut self,
        run: &TextRun,
        seq: &PDFTextSeq,
        pos: Point,
        font: &Arc<dyn PDFFont>,
        graphicstate: &PDFGraphicState,
    ) -> Point {
        let vertical = font.is_vertical();
        let dxscale = 0.001 * run.fontsize * run.scaling;
        let (mut x, mut y) = pos;
        let mut needcharspace = false;
        for item in seq {
            match item {
                PDFTextSeqItem::Number(n) => {
                    if vertical {
                        y -= n * dxscale;
                    } else {
                        x -= n * dxscale;
                    }
                    needcharspace = true;
                }
                PDFTextSeqItem::Bytes(data) => {
                    for cid in font.decode(data) {
                        let cursor = if vertical { &mut y } else { &mut x };
                        if needcharspace {
                            *cursor += run.charspace;
                        }
                        let adv = if run.visible {
                            self.render_char(
                                translate_matrix(run.matrix, (x, y)),
                                font,
                                run.fontsize,
                                run.scaling,
                                run.rise,
                                cid,
                                &graphicstate.ncs,
                                graphicstate,
                            )
                        } else {
                            font.char_width(cid) * run.fontsize * run.scaling
                        };
                        let cursor = if vertical { &mut y } else { &mut x };
                        *cursor += adv;
                        if cid == 32 && run.wordspace != 0.0 {
                            *cursor += run.wordspace;
                        }
                        needcharspace = true;
                    }
                }
            }
        }
        (x, y)
    }
}

/// Text parameters shared by every glyph of one shown string.
#[derive(Debug, Clone, Copy)]
pub struct TextRun {
    pub matrix: Matrix,
    pub fontsize: f64,
    pub scaling: f64,
    pub charspace: f64,
    pub wordspace: f64,
    pub rise: f64,
    pub visible: bool,
}
