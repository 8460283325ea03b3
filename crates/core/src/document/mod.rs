//! Document structure: loading, the page tree and object helpers.
//!
//! - `catalog` - document loading and metadata (PDFDocument)
//! - `page` - page geometry and content (PDFPage)
//! - `objects` - reference-resolving accessors over `lopdf` objects

pub mod catalog;
pub mod objects;
pub mod page;

pub use catalog::PDFDocument;
pub use page::PDFPage;
