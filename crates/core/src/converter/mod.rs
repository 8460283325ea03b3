//! Output devices built on the layout analyzer.
//!
//! - `PDFLayoutAnalyzer`: builds layout trees from interpreter events
//! - `PDFPageAggregator`: collects analyzed pages for later retrieval
//! - `TextConverter`: plain text output

mod base;
mod text;

pub use base::{PDFLayoutAnalyzer, PDFPageAggregator};
pub use text::TextConverter;
