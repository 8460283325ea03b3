//! Layout element types.
//!
//! - `LTChar`, `LTAnno`: placed glyphs and inferred spaces/newlines
//! - `LTTextLine`, `LTTextBox`, `LTTextGroup`: products of the layout pass
//! - `LTCurve`, `LTLine`, `LTRect`, `LTImage`: painted graphics
//! - `LTFigure`, `LTPage`: containers
//! - `LTItem`: closed enum over everything a container can hold

/// Implements HasBBox by delegating to a field.
///
/// Field mode reads `self.field.x0` directly; method mode calls
/// `self.field.x0()`.
macro_rules! impl_has_bbox_delegate {
    ($type:ty, $field:ident, method) => {
        impl crate::utils::HasBBox for $type {
            fn x0(&self) -> f64 {
                self.$field.x0()
            }
            fn y0(&self) -> f64 {
                self.$field.y0()
            }
            fn x1(&self) -> f64 {
                self.$field.x1()
            }
            fn y1(&self) -> f64 {
                self.$field.y1()
            }
        }
    };
    ($type:ty, $field:ident) => {
        impl crate::utils::HasBBox for $type {
            fn x0(&self) -> f64 {
                self.$field.x0
            }
            fn y0(&self) -> f64 {
                self.$field.y0
            }
            fn x1(&self) -> f64 {
                self.$field.x1
            }
            fn y1(&self) -> f64 {
                self.$field.y1
            }
        }
    };
}

mod character;
mod component;
mod container;
mod graphics;
mod item;
mod textbox;
mod textline;

pub use character::{GlyphPlacement, LTAnno, LTChar};
pub use component::{LTComponent, Proximity};
pub use container::{LTFigure, LTPage};
pub use graphics::{LTCurve, LTImage, LTLine, LTRect, PathStyle};
pub use item::LTItem;
pub use textbox::{LTTextBox, LTTextGroup, TextGroupElement};
pub(crate) use textbox::order_groups;
pub use textline::{LTTextLine, TextLineElement, WritingMode};
