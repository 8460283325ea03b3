//! PDF document: loading, decryption, catalog and metadata access.

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use super::objects;
use super::page::PDFPage;
use crate::error::{PdfError, Result};
use crate::utils::decode_text;

/// A parsed PDF document with its page tree flattened into document order.
pub struct PDFDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl PDFDocument {
    /// Parse a document from memory.
    ///
    /// Encrypted documents are decrypted with `password`; a wrong password is
    /// logged and parsing continues, so text from such files comes out empty
    /// or garbled rather than failing outright.
    pub fn new(data: &[u8], password: &str) -> Result<Self> {
        let mut doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            if let Err(err) = doc.decrypt(password) {
                warn!(error = ?err, "cannot decrypt document");
            }
        }
        let page_ids = doc.get_pages().into_values().collect();
        Ok(Self { doc, page_ids })
    }

    /// The underlying object graph.
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// Number of page leaves in the page tree.
    ///
    /// A root `/Count` that disagrees with the tree is ignored; pages that
    /// cannot be reached could not be extracted anyway.
    pub fn page_count(&self) -> usize {
        let leaves = self.page_ids.len();
        if let Some(declared) = self.declared_count()
            && declared != leaves
        {
            debug!(declared, leaves, "/Count disagrees with page tree");
        }
        leaves
    }

    fn declared_count(&self) -> Option<usize> {
        let root = objects::get(&self.doc, &self.doc.trailer, b"Root")?.as_dict().ok()?;
        let pages = objects::get_dict(&self.doc, root, b"Pages")?;
        objects::get_num(&self.doc, pages, b"Count").map(|n| n as usize)
    }

    /// Document title from the Info dictionary.
    pub fn title(&self) -> Option<String> {
        let info = objects::get_dict(&self.doc, &self.doc.trailer, b"Info")?;
        match objects::get(&self.doc, info, b"Title")? {
            Object::String(bytes, _) => {
                let title = decode_text(bytes);
                let title = title.trim_end_matches('\0').trim();
                (!title.is_empty()).then(|| title.to_string())
            }
            _ => None,
        }
    }

    /// Load the page at a 0-based index.
    pub fn get_page(&self, index: usize) -> Result<PDFPage> {
        let id = self
            .page_ids
            .get(index)
            .copied()
            .ok_or_else(|| PdfError::KeyError(format!("page index {index}")))?;
        PDFPage::from_object(&self.doc, index, id)
    }

    /// Iterate over pages in document order.
    ///
    /// `page_numbers` restricts the walk to the given 0-based indices;
    /// `maxpages` stops after that many yielded pages (0 means no limit).
    pub fn pages<'a>(
        &'a self,
        page_numbers: Option<&'a [usize]>,
        maxpages: usize,
    ) -> impl Iterator<Item = Result<PDFPage>> + 'a {
        let limit = if maxpages == 0 { usize::MAX } else { maxpages };
        (0..self.page_ids.len())
            .filter(move |i| page_numbers.is_none_or(|wanted| wanted.contains(i)))
            .take(limit)
            .map(|i| self.get_page(i))
    }
}

impl std::fmt::Debug for PDFDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PDFDocument")
            .field("version", &self.doc.version)
            .field("pages", &self.page_ids.len())
            .finish()
    }
}
