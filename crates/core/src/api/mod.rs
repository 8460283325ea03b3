//! Public extraction API.
//!
//! - `high_level` - single-pass extraction of selected pages
//! - `pipeline` - concurrent extraction over page ranges
//! - `convert` - the converter entry point used by callers with raw input
//!
//! # Example
//!
//! ```ignore
//! use quire_core::api::{PdfConverter, Pipeline, PipelineConfig, ExtractOptions, StreamInfo};
//!
//! let pipeline = Pipeline::with_options(PipelineConfig::default(), ExtractOptions::default())?;
//! let converter = PdfConverter::new(pipeline);
//! let file = std::fs::File::open("document.pdf")?;
//! let result = converter.convert(file, &StreamInfo::default())?;
//! ```

pub mod convert;
pub mod high_level;
pub mod pipeline;

pub use convert::{ConversionResult, PdfConverter, StreamInfo};
pub use high_level::{ExtractOptions, extract_pages, extract_text, extract_text_with_document};
pub use pipeline::{
    Extraction, PageRange, PdfRangeExtractor, Pipeline, PipelineConfig, RangeExtractor, partition,
};
