//! Error types for the quire extraction library.

use thiserror::Error;

/// Primary error type for document parsing and extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document parse error: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("PDF syntax error: {0}")]
    SyntaxError(String),

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("page {pageid}: {open} figure(s) still open at end of page")]
    UnbalancedFigure { pageid: usize, open: usize },

    #[error("end_figure({0}) without a matching begin_figure")]
    UnmatchedEndFigure(String),

    #[error("no active layout container for {0}")]
    NoActiveContainer(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("worker pool error: {0}")]
    Pool(String),

    #[error("worker for pages {start}..{end} failed: {msg}")]
    Worker { start: usize, end: usize, msg: String },

    #[error("image description failed: {0}")]
    ImageDescription(String),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
