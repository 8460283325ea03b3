//! Helpers for walking `lopdf` object graphs.
//!
//! Every accessor resolves indirect references and returns `None` instead of
//! failing, so callers can apply PDF defaults for missing or broken entries.

use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::{PdfError, Result};

/// Longest reference chain followed before giving up (guards reference cycles).
const MAX_REFERENCE_DEPTH: usize = 32;

/// Longest `/Parent` chain followed when looking up inherited page attributes.
const MAX_INHERIT_DEPTH: usize = 64;

/// Follow indirect references until a direct object is reached.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Resolved dictionary lookup.
pub fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

pub fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

pub fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [Object]> {
    match get(doc, dict, key)? {
        Object::Array(arr) => Some(arr.as_slice()),
        _ => None,
    }
}

pub fn get_stream<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Stream> {
    match get(doc, dict, key)? {
        Object::Stream(s) => Some(s),
        _ => None,
    }
}

/// Name value as a UTF-8 string (lossy).
pub fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

pub fn get_num(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    get(doc, dict, key).and_then(num)
}

/// Numeric value of an Integer or Real object.
pub fn num(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Numeric array; a single non-numeric element fails the whole read.
pub fn num_array(doc: &Document, arr: &[Object]) -> Option<Vec<f64>> {
    arr.iter()
        .map(|obj| resolve(doc, obj).and_then(num))
        .collect()
}

/// Read a four-number rectangle array, normalised so x0 <= x1 and y0 <= y1.
pub fn rect(doc: &Document, obj: &Object) -> Option<(f64, f64, f64, f64)> {
    let Object::Array(arr) = resolve(doc, obj)? else {
        return None;
    };
    match num_array(doc, arr)?.as_slice() {
        [x0, y0, x1, y1] => Some((x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1))),
        _ => None,
    }
}

/// Look up a key on a page dictionary, walking `/Parent` links when absent.
pub fn get_inherited<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = dict;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Some(found) = get(doc, current, key) {
            return Some(found);
        }
        current = get_dict(doc, current, b"Parent")?;
    }
    None
}

/// Stream payload with its filters applied.
pub fn stream_data(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| PdfError::SyntaxError(format!("cannot decode stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}
