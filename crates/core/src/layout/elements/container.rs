//! Containers: LTFigure and LTPage.

use crate::utils::{Matrix, Rect, apply_matrix_rect};

use super::component::LTComponent;
use super::item::LTItem;

/// A form XObject or image placement; children are in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct LTFigure {
    pub(crate) component: LTComponent,
    name: String,
    /// Form matrix composed with the CTM in effect at `Do`.
    matrix: Matrix,
    pub(crate) items: Vec<LTItem>,
}

impl LTFigure {
    /// `bbox` is in the figure's own space; the figure's box is its image
    /// under `matrix`.
    pub fn new(name: &str, bbox: Rect, matrix: Matrix) -> Self {
        Self {
            component: LTComponent::new(apply_matrix_rect(matrix, bbox)),
            name: name.to_string(),
            matrix,
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn matrix(&self) -> Matrix {
        self.matrix
    }

    pub fn items(&self) -> &[LTItem] {
        &self.items
    }

    pub fn add(&mut self, item: LTItem) {
        self.items.push(item);
    }
}

/// Root of one page's layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LTPage {
    pub(crate) component: LTComponent,
    /// 1-based page number.
    pageid: usize,
    pub(crate) items: Vec<LTItem>,
}

impl LTPage {
    pub fn new(pageid: usize, bbox: Rect) -> Self {
        Self {
            component: LTComponent::new(bbox),
            pageid,
            items: Vec::new(),
        }
    }

    pub const fn pageid(&self) -> usize {
        self.pageid
    }

    pub fn items(&self) -> &[LTItem] {
        &self.items
    }

    pub fn add(&mut self, item: LTItem) {
        self.items.push(item);
    }
}

impl_has_bbox_delegate!(LTFigure, component);
impl_has_bbox_delegate!(LTPage, component);
