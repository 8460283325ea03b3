//! Layout analysis for extracted pages.
//!
//! - `elements`: the layout item tree (LTPage, LTFigure, LTChar, LTTextBox, ...)
//! - `params`: layout analysis parameters
//! - `analysis`: grouping characters into lines, boxes and reading order

pub mod analysis;
pub mod elements;
pub mod params;

pub use analysis::analyze_items;
pub use elements::*;
pub use params::LAParams;
