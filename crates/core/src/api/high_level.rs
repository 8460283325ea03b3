//! High-level extraction over an in-memory document.
//!
//! - `extract_text()` - text of the selected pages
//! - `extract_text_with_document()` - same, over an already-parsed document
//! - `extract_pages()` - analyzed layout trees of the selected pages

use std::sync::Arc;

use tracing::warn;

use crate::converter::{PDFPageAggregator, TextConverter};
use crate::document::{PDFDocument, PDFPage};
use crate::error::Result;
use crate::image::ImageDescriber;
use crate::interp::{PDFDevice, PDFPageInterpreter, PDFResourceManager};
use crate::layout::{LAParams, LTPage};

/// Options for text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Password for encrypted documents.
    pub password: String,
    /// Zero-based page indices to extract. `None` means all pages.
    pub page_numbers: Option<Vec<usize>>,
    /// Maximum number of pages to extract. 0 means no limit.
    pub maxpages: usize,
    /// Reuse parsed fonts across pages.
    pub caching: bool,
    /// Layout analysis parameters. `None` skips the layout pass.
    ///
    /// Defaults to `Some(LAParams::default())`, so chars are grouped into
    /// lines and boxes. Set `None` for the raw glyph stream, one form feed
    /// per page with no line breaks.
    pub laparams: Option<LAParams>,
    /// Extra clockwise rotation applied to every page, in degrees.
    pub rotation: i64,
    /// Write a `Page N` header before each page.
    pub show_pageno: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            password: String::new(),
            page_numbers: None,
            maxpages: 0,
            caching: true,
            laparams: Some(LAParams::default()),
            rotation: 0,
            show_pageno: false,
        }
    }
}

impl ExtractOptions {
    /// Restrict extraction to the contiguous pages `start..end`.
    pub fn for_range(mut self, start: usize, end: usize) -> Self {
        self.page_numbers = Some((start..end).collect());
        self
    }

    /// Number given to the first extracted page.
    fn first_pageno(&self) -> usize {
        self.page_numbers
            .as_deref()
            .and_then(|nums| nums.iter().min())
            .map_or(1, |first| first + 1)
    }
}

/// Parse a document and return the text of the selected pages.
///
/// # Example
/// ```ignore
/// use quire_core::api::{extract_text, ExtractOptions};
///
/// let pdf_bytes = std::fs::read("document.pdf")?;
/// let text = extract_text(&pdf_bytes, &ExtractOptions::default())?;
/// ```
pub fn extract_text(pdf_data: &[u8], options: &ExtractOptions) -> Result<String> {
    let doc = PDFDocument::new(pdf_data, &options.password)?;
    extract_text_with_document(&doc, options, None)
}

/// Extract text from an already-parsed document.
///
/// Pages that cannot be loaded or that break layout invariants are logged
/// and skipped.
pub fn extract_text_with_document(
    doc: &PDFDocument,
    options: &ExtractOptions,
    describer: Option<Arc<dyn ImageDescriber>>,
) -> Result<String> {
    let mut converter = TextConverter::with_describer(
        options.laparams.clone(),
        options.first_pageno(),
        options.show_pageno,
        describer,
    );
    process_pages(doc, options, &mut converter);
    Ok(converter.into_text())
}

/// Parse a document and return the analyzed layout of the selected pages.
pub fn extract_pages(pdf_data: &[u8], options: &ExtractOptions) -> Result<Vec<LTPage>> {
    let doc = PDFDocument::new(pdf_data, &options.password)?;
    let mut aggregator = PDFPageAggregator::new(options.laparams.clone(), options.first_pageno());
    process_pages(&doc, options, &mut aggregator);
    Ok(aggregator.into_pages())
}

fn process_pages<D: PDFDevice>(doc: &PDFDocument, options: &ExtractOptions, device: &mut D) {
    let mut rsrcmgr = PDFResourceManager::with_caching(options.caching);
    for page in doc.pages(options.page_numbers.as_deref(), options.maxpages) {
        match page {
            Ok(page) => process_page(page, options.rotation, &mut rsrcmgr, device, doc),
            Err(err) => warn!(error = %err, "skipping unreadable page"),
        }
    }
}

/// Run one page through the interpreter into `device`.
pub(crate) fn process_page<D: PDFDevice>(
    mut page: PDFPage,
    rotation: i64,
    rsrcmgr: &mut PDFResourceManager,
    device: &mut D,
    doc: &PDFDocument,
) {
    if rotation != 0 {
        page.rotate_by(rotation);
    }
    let mut interpreter = PDFPageInterpreter::new(rsrcmgr, device, doc.inner());
    interpreter.process_page(&page);
}
