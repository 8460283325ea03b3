//! Character types: LTChar and LTAnno.

use std::sync::Arc;

use crate::font::{CharDisp, PDFFont};
use crate::model::PDFGraphicState;
use crate::utils::{Matrix, Rect, apply_matrix_pt};

use super::component::LTComponent;

/// Virtual character inserted by the layout pass (word spaces, line ends).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LTAnno {
    text: String,
}

impl LTAnno {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }
}

/// A placed glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct LTChar {
    pub(crate) component: LTComponent,
    text: String,
    fontname: String,
    /// Font size as drawn: box height, or width for vertical writing.
    size: f64,
    /// Advance in text space.
    adv: f64,
    upright: bool,
    matrix: Matrix,
    ncs: String,
    non_stroking_color: Vec<f64>,
    stroking_color: Vec<f64>,
}

/// Glyph metrics and text parameters needed to place one character.
#[derive(Debug, Clone, Copy)]
pub struct GlyphPlacement {
    pub matrix: Matrix,
    pub fontsize: f64,
    pub scaling: f64,
    pub rise: f64,
    /// Width from `PDFFont::char_width`.
    pub textwidth: f64,
    pub textdisp: CharDisp,
}

impl LTChar {
    /// Place a glyph: compute its box from the font metrics and the text
    /// rendering matrix.
    pub fn new(
        placement: GlyphPlacement,
        font: &Arc<dyn PDFFont>,
        text: String,
        graphicstate: &PDFGraphicState,
    ) -> Self {
        let GlyphPlacement {
            matrix,
            fontsize,
            scaling,
            rise,
            textwidth,
            textdisp,
        } = placement;
        let adv = textwidth * fontsize * scaling;
        let (lower_left, upper_right) = match textdisp {
            CharDisp::Vertical(vx, vy) => {
                let vx = vx.map_or(fontsize * 0.5, |vx| vx * fontsize * 0.001);
                let vy = (1000.0 - vy) * fontsize * 0.001;
                ((-vx, vy + rise + adv), (-vx + fontsize, vy + rise))
            }
            CharDisp::Horizontal(_) => {
                let descent = font.get_descent() * fontsize;
                ((0.0, descent + rise), (adv, descent + rise + fontsize))
            }
        };
        let (a, b, c, d, _, _) = matrix;
        let upright = a * d * scaling > 0.0 && b * c <= 0.0;
        let (x0, y0) = apply_matrix_pt(matrix, lower_left);
        let (x1, y1) = apply_matrix_pt(matrix, upper_right);
        let component = LTComponent::new((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)));
        let size = if font.is_vertical() {
            component.x1 - component.x0
        } else {
            component.y1 - component.y0
        };
        Self {
            component,
            text,
            fontname: font.fontname().to_string(),
            size,
            adv,
            upright,
            matrix,
            ncs: graphicstate.ncs.name.clone(),
            non_stroking_color: graphicstate.ncolor.to_vec(),
            stroking_color: graphicstate.scolor.to_vec(),
        }
    }

    /// A character with a given box and no font metrics; used to build
    /// layouts directly.
    pub fn with_bbox(bbox: Rect, text: &str, fontname: &str) -> Self {
        let component = LTComponent::new(bbox);
        Self {
            component,
            text: text.to_string(),
            fontname: fontname.to_string(),
            size: component.y1 - component.y0,
            adv: component.x1 - component.x0,
            upright: true,
            matrix: (1.0, 0.0, 0.0, 1.0, bbox.0, bbox.1),
            ncs: "DeviceGray".to_string(),
            non_stroking_color: vec![0.0],
            stroking_color: vec![0.0],
        }
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn fontname(&self) -> &str {
        &self.fontname
    }

    pub const fn size(&self) -> f64 {
        self.size
    }

    pub const fn adv(&self) -> f64 {
        self.adv
    }

    pub const fn upright(&self) -> bool {
        self.upright
    }

    pub const fn matrix(&self) -> Matrix {
        self.matrix
    }

    pub fn ncs(&self) -> &str {
        &self.ncs
    }

    pub fn non_stroking_color(&self) -> &[f64] {
        &self.non_stroking_color
    }

    pub fn stroking_color(&self) -> &[f64] {
        &self.stroking_color
    }
}

impl_has_bbox_delegate!(LTChar, component);
