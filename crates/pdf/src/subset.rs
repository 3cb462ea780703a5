use lopdf::{Document, Object};

use crate::{PageId, PdfError};

/// Page-dictionary keys a page may inherit from ancestor nodes. These must
/// be materialized onto each kept page before the tree is flattened, or the
/// pruned intermediate nodes would take the values with them.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Serialize a copy of `source` containing only `page_ids`, in exactly that
/// order.
///
/// Works on a clone of the document: the root Pages node's Kids array is
/// replaced with the selected pages, its Count updated, and each kept page
/// reparented directly under the root node. Objects no longer reachable
/// (dropped pages, emptied intermediate tree nodes) are pruned before
/// saving. The source document is never touched.
pub(crate) fn subset_document(source: &Document, page_ids: &[PageId]) -> Result<Vec<u8>, PdfError> {
    let mut doc = source.clone();

    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(|o| o.as_reference())
        .map_err(|e| PdfError::Parse(format!("no Root in trailer: {e}")))?;

    let pages_id = {
        let catalog = doc
            .get_object(catalog_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfError::Parse(format!("cannot read catalog: {e}")))?;
        catalog
            .get(b"Pages")
            .and_then(|o| o.as_reference())
            .map_err(|e| PdfError::Parse(format!("catalog has no Pages reference: {e}")))?
    };

    // Materialize inherited attributes while the original tree is intact.
    for &page_id in page_ids {
        materialize_inherited(&mut doc, page_id)?;
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    {
        let pages_dict = doc
            .get_object_mut(pages_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| PdfError::Parse(format!("cannot read Pages node: {e}")))?;
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_ids.len() as i64));
    }

    for &page_id in page_ids {
        match doc.get_object_mut(page_id) {
            Ok(Object::Dictionary(dict)) => dict.set("Parent", Object::Reference(pages_id)),
            _ => {
                return Err(PdfError::Parse(format!(
                    "page object {page_id:?} is not a dictionary"
                )))
            }
        }
    }

    doc.prune_objects();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Save(e.to_string()))?;
    Ok(out)
}

/// Copy any inheritable attribute the page does not define itself down from
/// its ancestor chain onto the page dictionary.
fn materialize_inherited(doc: &mut Document, page_id: PageId) -> Result<(), PdfError> {
    for key in INHERITABLE_KEYS {
        let already_present = doc
            .get_object(page_id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .is_some_and(|d| d.has(key));
        if already_present {
            continue;
        }
        if let Some(value) = lookup_inherited(doc, page_id, key) {
            match doc.get_object_mut(page_id) {
                Ok(Object::Dictionary(dict)) => dict.set(key.to_vec(), value),
                _ => {
                    return Err(PdfError::Parse(format!(
                        "page object {page_id:?} is not a dictionary"
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Walk up the Parent chain looking for `key`, starting at the page itself.
fn lookup_inherited(doc: &Document, page_id: PageId, key: &[u8]) -> Option<Object> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        if let Ok(value) = dict.get(key) {
            if !matches!(value, Object::Null) {
                return Some(value.clone());
            }
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Three-page document with Resources and MediaBox only on the root
    /// Pages node.
    fn doc_with_inherited_attrs() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for _ in 0..3 {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 3,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn subset_keeps_requested_order() {
        let doc = doc_with_inherited_attrs();
        let ids: Vec<PageId> = doc.get_pages().into_values().collect();

        let out = subset_document(&doc, &[ids[2], ids[0]]).unwrap();
        let reloaded = Document::load_mem(&out).unwrap();
        let pages = reloaded.get_pages();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn subset_of_empty_selection_is_valid() {
        let doc = doc_with_inherited_attrs();
        let out = subset_document(&doc, &[]).unwrap();
        let reloaded = Document::load_mem(&out).unwrap();
        assert!(reloaded.get_pages().is_empty());
    }

    #[test]
    fn inherited_attributes_are_materialized() {
        let doc = doc_with_inherited_attrs();
        let ids: Vec<PageId> = doc.get_pages().into_values().collect();

        let out = subset_document(&doc, &[ids[1]]).unwrap();
        let reloaded = Document::load_mem(&out).unwrap();
        let (_, page_id) = reloaded.get_pages().into_iter().next().unwrap();
        let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn lookup_inherited_walks_ancestors() {
        let doc = doc_with_inherited_attrs();
        let ids: Vec<PageId> = doc.get_pages().into_values().collect();
        assert!(lookup_inherited(&doc, ids[0], b"MediaBox").is_some());
        assert!(lookup_inherited(&doc, ids[0], b"CropBox").is_none());
    }
}
