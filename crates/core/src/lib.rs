//! quire - PDF layout analysis and concurrent page-range text extraction.
//!
//! Pages are interpreted into layout trees (`converter::PDFLayoutAnalyzer`),
//! grouped into lines and boxes (`layout`), and rendered as text
//! (`converter::TextConverter`). `api::Pipeline` runs that per page range on
//! a worker pool and stitches the ranges back together in page order.

pub mod api;
pub mod converter;
pub mod document;
pub mod error;
pub mod font;
pub mod image;
pub mod interp;
pub mod layout;
pub mod model;
pub mod utils;

pub use api::high_level;
pub use error::{PdfError, Result};
