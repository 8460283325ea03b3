//! PDF pages: geometry, rotation, resources and content streams.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use super::objects;
use crate::error::{PdfError, Result};
use crate::utils::Rect;

/// US Letter, used when a page declares no usable MediaBox.
const DEFAULT_MEDIABOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// A single page, detached from the page tree.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// 0-based position in document order.
    pub index: usize,
    /// Object number of the page dictionary.
    pub pageid: u32,
    pub mediabox: Rect,
    pub cropbox: Rect,
    /// Rotation in degrees, normalised to 0, 90, 180 or 270.
    pub rotate: i64,
    /// Resource dictionary, inherited from ancestors when the page has none.
    pub resources: Dictionary,
    /// Decoded content streams, concatenated in order.
    pub contents: Vec<u8>,
}

impl PDFPage {
    /// Build a page from its dictionary, resolving inherited attributes.
    pub fn from_object(doc: &Document, index: usize, id: ObjectId) -> Result<Self> {
        let dict = doc.get_dictionary(id)?;

        let mediabox = objects::get_inherited(doc, dict, b"MediaBox")
            .and_then(|obj| objects::rect(doc, obj))
            .unwrap_or_else(|| {
                warn!(pageid = id.0, "MediaBox missing, assuming US Letter");
                DEFAULT_MEDIABOX
            });
        let cropbox = objects::get_inherited(doc, dict, b"CropBox")
            .and_then(|obj| objects::rect(doc, obj))
            .unwrap_or(mediabox);
        let rotate = objects::get_inherited(doc, dict, b"Rotate")
            .and_then(objects::num)
            .map(|r| normalize_rotation(r as i64))
            .unwrap_or(0);
        let resources = match objects::get_inherited(doc, dict, b"Resources") {
            Some(Object::Dictionary(d)) => d.clone(),
            _ => Dictionary::new(),
        };
        let contents = Self::read_contents(doc, dict)?;

        Ok(Self {
            index,
            pageid: id.0,
            mediabox,
            cropbox,
            rotate,
            resources,
            contents,
        })
    }

    /// Turn the page by a further `degrees`, clockwise.
    pub fn rotate_by(&mut self, degrees: i64) {
        self.rotate = normalize_rotation(self.rotate + degrees);
    }

    /// Contents may be a single stream or an array of streams. Undecodable
    /// parts are skipped; an unresolvable `/Contents` entry yields no content.
    fn read_contents(doc: &Document, dict: &Dictionary) -> Result<Vec<u8>> {
        let Some(obj) = objects::get(doc, dict, b"Contents") else {
            return Ok(Vec::new());
        };
        let streams: Vec<&lopdf::Stream> = match obj {
            Object::Stream(s) => vec![s],
            Object::Array(parts) => parts
                .iter()
                .filter_map(|p| match objects::resolve(doc, p) {
                    Some(Object::Stream(s)) => Some(s),
                    _ => None,
                })
                .collect(),
            other => {
                return Err(PdfError::TypeError {
                    expected: "stream or array",
                    got: object_kind(other),
                });
            }
        };

        let mut data = Vec::new();
        for stream in streams {
            match objects::stream_data(stream) {
                Ok(bytes) => {
                    data.extend_from_slice(&bytes);
                    data.push(b'\n');
                }
                Err(err) => debug!(%err, "skipping content stream"),
            }
        }
        Ok(data)
    }
}

fn object_kind(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) => "integer",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

fn normalize_rotation(r: i64) -> i64 {
    let r = r.rem_euclid(360);
    r - r % 90
}
