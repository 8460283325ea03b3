//! Graphics and text state carried by the content-stream interpreter.

pub mod color;
pub mod state;

pub use color::PDFColorSpace;
pub use state::{Color, PDFGraphicState, PDFTextState};
