//! Font handling for text extraction.
//!
//! - `pdffont` - simple and composite fonts behind the `PDFFont` trait
//! - `cmap` - ToUnicode CMap parsing
//! - `encoding` - base encodings and glyph-name resolution

pub mod cmap;
pub mod encoding;
pub mod pdffont;

pub use cmap::UnicodeMap;
pub use encoding::BaseEncoding;
pub use pdffont::{CharDisp, PDFCIDFont, PDFFont, PDFSimpleFont, load_font};
