//! PDF content stream interpretation and device output.
//!
//! - `interpreter`: page interpreter and font-sharing resource manager
//! - `device`: device traits receiving drawing and text events
//! - `ops`: operator implementations by category

pub mod device;
pub mod interpreter;
pub mod ops;

pub use device::{PDFDevice, PDFTextDevice, PDFTextSeq, PDFTextSeqItem, PathSegment, TextRun};
pub use interpreter::{PDFPageInterpreter, PDFResourceManager};
