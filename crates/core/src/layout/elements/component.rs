//! Base component with a bounding box.

use crate::utils::{HasBBox, Rect};

/// Axis-aligned bounding box shared by every layout item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LTComponent {
    pub(crate) x0: f64,
    pub(crate) y0: f64,
    pub(crate) x1: f64,
    pub(crate) y1: f64,
}

impl LTComponent {
    pub const fn new(bbox: Rect) -> Self {
        let (x0, y0, x1, y1) = bbox;
        Self { x0, y0, x1, y1 }
    }

    /// An inverted box that any `expand` call replaces.
    pub const fn empty() -> Self {
        Self::new((f64::MAX, f64::MAX, -f64::MAX, -f64::MAX))
    }

    /// Grow to cover `other`.
    pub fn expand(&mut self, other: &impl HasBBox) {
        self.x0 = self.x0.min(other.x0());
        self.y0 = self.y0.min(other.y0());
        self.x1 = self.x1.max(other.x1());
        self.y1 = self.y1.max(other.y1());
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

impl HasBBox for LTComponent {
    fn x0(&self) -> f64 {
        self.x0
    }
    fn y0(&self) -> f64 {
        self.y0
    }
    fn x1(&self) -> f64 {
        self.x1
    }
    fn y1(&self) -> f64 {
        self.y1
    }
}

/// Overlap and distance tests between two boxes.
pub trait Proximity: HasBBox {
    fn is_hoverlap(&self, other: &impl HasBBox) -> bool {
        other.x0() <= self.x1() && self.x0() <= other.x1()
    }

    /// Horizontal gap, 0 when the boxes overlap.
    fn hdistance(&self, other: &impl HasBBox) -> f64 {
        if self.is_hoverlap(other) {
            0.0
        } else {
            (self.x0() - other.x1()).abs().min((self.x1() - other.x0()).abs())
        }
    }

    fn hoverlap(&self, other: &impl HasBBox) -> f64 {
        if self.is_hoverlap(other) {
            (self.x0() - other.x1()).abs().min((self.x1() - other.x0()).abs())
        } else {
            0.0
        }
    }

    fn is_voverlap(&self, other: &impl HasBBox) -> bool {
        other.y0() <= self.y1() && self.y0() <= other.y1()
    }

    /// Vertical gap, 0 when the boxes overlap.
    fn vdistance(&self, other: &impl HasBBox) -> f64 {
        if self.is_voverlap(other) {
            0.0
        } else {
            (self.y0() - other.y1()).abs().min((self.y1() - other.y0()).abs())
        }
    }

    fn voverlap(&self, other: &impl HasBBox) -> f64 {
        if self.is_voverlap(other) {
            (self.y0() - other.y1()).abs().min((self.y1() - other.y0()).abs())
        } else {
            0.0
        }
    }
}

impl<T: HasBBox> Proximity for T {}
