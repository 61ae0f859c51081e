//! Helpers for reading `lopdf` objects.
//!
//! Every lookup resolves indirect references, and a missing or mistyped entry
//! is reported as `None`. Callers decide whether absence is an error.

use lopdf::{Dictionary, Document, Object, Stream};

/// Maximum length of a reference chain before giving up.
const MAX_REFERENCE_DEPTH: usize = 32;

/// Follow indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(e) => {
                    log::debug!("Dangling reference {:?}: {}", id, e);
                    return None;
                },
            },
            direct => return Some(direct),
        }
    }
    log::warn!("Reference chain longer than {} links", MAX_REFERENCE_DEPTH);
    None
}

/// Look up `key` and resolve the value.
pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

/// View a resolved object as a dictionary; streams expose their dictionary.
pub(crate) fn as_dict(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

pub(crate) fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    get(doc, dict, key).and_then(as_dict)
}

pub(crate) fn get_stream<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Stream> {
    match get(doc, dict, key)? {
        Object::Stream(stream) => Some(stream),
        _ => None,
    }
}

pub(crate) fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Vec<Object>> {
    match get(doc, dict, key)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

pub(crate) fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f32> {
    get(doc, dict, key).and_then(number)
}

pub(crate) fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    get(doc, dict, key).and_then(name)
}

/// Read a numeric object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Read a name object.
pub(crate) fn name(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Read an array of numbers, resolving each element.
pub(crate) fn numbers(doc: &Document, items: &[Object]) -> Vec<f32> {
    items
        .iter()
        .filter_map(|item| resolve(doc, item).and_then(number))
        .collect()
}

/// Decoded stream data, falling back to the raw bytes for unsupported filters.
pub(crate) fn stream_data(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_resolve_follows_references() {
        let mut doc = Document::with_version("1.5");
        let inner = doc.add_object(Object::Integer(42));
        let outer = doc.add_object(Object::Reference(inner));
        let obj = Object::Reference(outer);
        assert_eq!(resolve(&doc, &obj).and_then(number), Some(42.0));
    }

    #[test]
    fn test_dangling_reference_is_none() {
        let doc = Document::with_version("1.5");
        let obj = Object::Reference((99, 0));
        assert!(resolve(&doc, &obj).is_none());
    }

    #[test]
    fn test_typed_getters() {
        let mut doc = Document::with_version("1.5");
        let width = doc.add_object(Object::Real(12.5));
        let dict = dictionary! {
            "Type" => "Font",
            "Width" => width,
            "Box" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        assert_eq!(get_name(&doc, &dict, b"Type").as_deref(), Some("Font"));
        assert_eq!(get_number(&doc, &dict, b"Width"), Some(12.5));
        let items = get_array(&doc, &dict, b"Box").unwrap();
        assert_eq!(numbers(&doc, items), vec![0.0, 0.0, 612.0, 792.0]);
        assert!(get_dict(&doc, &dict, b"Missing").is_none());
    }
}
