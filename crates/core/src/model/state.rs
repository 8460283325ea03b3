//! PDF Graphics and Text State.

use std::sync::Arc;

use super::color::PDFColorSpace;
use crate::font::PDFFont;
use crate::utils::{MATRIX_IDENTITY, Matrix, Point};

/// Color value in one of the device color models.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Greyscale color (0.0 = black, 1.0 = white)
    Gray(f64),
    /// RGB color
    Rgb(f64, f64, f64),
    /// CMYK color
    Cmyk(f64, f64, f64, f64),
    /// Pattern or other non-numeric paint, keyed by resource name
    Pattern(String),
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray(0.0)
    }
}

impl Color {
    /// Build a color from the numeric operands of a color operator.
    ///
    /// Returns None when the operand count matches no device model.
    pub fn from_components(components: &[f64]) -> Option<Self> {
        match *components {
            [g] => Some(Color::Gray(g)),
            [r, g, b] => Some(Color::Rgb(r, g, b)),
            [c, m, y, k] => Some(Color::Cmyk(c, m, y, k)),
            _ => None,
        }
    }

    /// Convert to a `Vec<f64>` for layout types.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Color::Gray(g) => vec![*g],
            Color::Rgb(r, g, b) => vec![*r, *g, *b],
            Color::Cmyk(c, m, y, k) => vec![*c, *m, *y, *k],
            Color::Pattern(_) => vec![],
        }
    }
}

/// PDF Text State - manages text positioning and rendering parameters.
#[derive(Debug, Clone)]
pub struct PDFTextState {
    /// Current font (None if not set)
    pub font: Option<Arc<dyn PDFFont>>,
    /// Current font resource name (e.g., "F1")
    pub fontname: Option<String>,
    /// Font size in user units
    pub fontsize: f64,
    /// Character spacing
    pub charspace: f64,
    /// Word spacing (applied to the single-byte space code)
    pub wordspace: f64,
    /// Horizontal scaling percentage (100 = normal)
    pub scaling: f64,
    /// Text leading, stored negated as the interpreter applies it
    pub leading: f64,
    /// Text rendering mode (0-7)
    pub render: i32,
    /// Text rise (superscript/subscript offset)
    pub rise: f64,
    /// Text matrix (Tm)
    pub matrix: Matrix,
    /// Line matrix - current position within text object
    pub linematrix: Point,
}

impl PDFTextState {
    /// Create a new text state with default values.
    pub fn new() -> Self {
        Self {
            font: None,
            fontname: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            render: 0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            linematrix: (0.0, 0.0),
        }
    }

    /// Reset text matrix and line matrix to defaults.
    ///
    /// Called at the start of each text object (BT operator).
    pub fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.linematrix = (0.0, 0.0);
    }

    /// Whether glyphs painted in the current render mode are visible.
    pub fn is_visible(&self) -> bool {
        self.render != 3 && self.render != 7
    }
}

impl Default for PDFTextState {
    fn default() -> Self {
        Self::new()
    }
}

/// PDF Graphics State - manages graphics rendering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFGraphicState {
    /// Line width for stroke operations
    pub linewidth: f64,
    /// Dash pattern: (array, phase)
    pub dash: Option<(Vec<f64>, f64)>,
    /// Stroking color
    pub scolor: Color,
    /// Stroking color space
    pub scs: PDFColorSpace,
    /// Non-stroking (fill) color
    pub ncolor: Color,
    /// Non-stroking color space
    pub ncs: PDFColorSpace,
}

impl PDFGraphicState {
    /// Create new graphics state with default values.
    pub fn new() -> Self {
        Self {
            linewidth: 0.0,
            dash: None,
            scolor: Color::Gray(0.0),
            scs: PDFColorSpace::default(),
            ncolor: Color::Gray(0.0),
            ncs: PDFColorSpace::default(),
        }
    }
}

impl Default for PDFGraphicState {
    fn default() -> Self {
        Self::new()
    }
}
