// lopdf object helpers

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guard against cyclic page trees.
const MAX_TREE_DEPTH: usize = 32;

/// Follow one indirect reference.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).and_then(|o| o.as_dict().ok())
}

/// Dictionary entry, references followed.
pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|o| resolve(doc, o))
}

/// A page attribute, looked up on the page and then up the page tree.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(value) = get(doc, node, key) {
            return Some(value);
        }
        node = get(doc, node, b"Parent")?.as_dict().ok()?;
    }
    None
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

pub(crate) fn numbers(doc: &Document, array: &[Object]) -> Option<Vec<f64>> {
    array
        .iter()
        .map(|o| resolve(doc, o).and_then(number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_accepts_integers_and_reals() {
        assert_eq!(number(&Object::Integer(612)), Some(612.0));
        assert_eq!(number(&Object::Real(0.5)), Some(0.5));
        assert_eq!(number(&Object::Name(b"F1".to_vec())), None);
    }

    #[test]
    fn test_inherited_walks_parents() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(792),
                        Object::Integer(612),
                    ]),
                ),
            ])),
        );

        let media_box = inherited(&doc, page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .and_then(|a| numbers(&doc, a));
        assert_eq!(media_box, Some(vec![0.0, 0.0, 792.0, 612.0]));
        assert!(inherited(&doc, page_id, b"Rotate").is_none());
    }
}
