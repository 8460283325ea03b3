//! LTItem - any node below a page.

use crate::utils::HasBBox;

use super::character::{LTAnno, LTChar};
use super::container::LTFigure;
use super::graphics::{LTCurve, LTImage, LTLine, LTRect};
use super::textbox::LTTextBox;
use super::textline::LTTextLine;

/// Dispatch a HasBBox method to the variant. Annotations have no box.
macro_rules! dispatch_hasbbox {
    ($self:ident, $method:ident) => {
        match $self {
            LTItem::Char(c) => c.$method(),
            LTItem::Anno(_) => 0.0,
            LTItem::Curve(c) => c.$method(),
            LTItem::Line(l) => l.$method(),
            LTItem::Rect(r) => r.$method(),
            LTItem::Image(i) => i.$method(),
            LTItem::TextLine(l) => l.$method(),
            LTItem::TextBox(b) => b.$method(),
            LTItem::Figure(f) => f.$method(),
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum LTItem {
    Char(LTChar),
    Anno(LTAnno),
    Curve(LTCurve),
    Line(LTLine),
    Rect(LTRect),
    Image(LTImage),
    TextLine(LTTextLine),
    TextBox(LTTextBox),
    Figure(Box<LTFigure>),
}

impl HasBBox for LTItem {
    fn x0(&self) -> f64 {
        dispatch_hasbbox!(self, x0)
    }
    fn y0(&self) -> f64 {
        dispatch_hasbbox!(self, y0)
    }
    fn x1(&self) -> f64 {
        dispatch_hasbbox!(self, x1)
    }
    fn y1(&self) -> f64 {
        dispatch_hasbbox!(self, y1)
    }
}
