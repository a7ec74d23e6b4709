//! Page-level PDF plumbing shared by concatenation and splitting
//!
//! This module handles:
//! - Building a flat page tree for a new output document
//! - Copying pages, and everything they reference, between documents
//! - Resolving attributes pages inherit from the page tree

use crate::constants::*;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// Output Page Tree
// =============================================================================

/// A new document assembled page by page.
///
/// Pages keep the order in which they are appended.
pub struct PageTreeBuilder {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
}

impl PageTreeBuilder {
    pub fn new() -> Self {
        let mut output = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = output.new_object_id();
        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
        }
    }

    /// Append one page of `source`.
    ///
    /// `cache` maps source object IDs to their copies and must only be reused
    /// for pages of the same source document.
    pub fn append_page(
        &mut self,
        source: &Document,
        page_id: ObjectId,
        cache: &mut HashMap<ObjectId, ObjectId>,
    ) -> Result<ObjectId> {
        let new_id = copy_page(&mut self.output, source, page_id, self.pages_tree_id, cache)?;
        self.page_refs.push(Object::Reference(new_id));
        Ok(new_id)
    }

    /// Append every page of `source` in page order, returning how many were added
    pub fn append_document(&mut self, source: &Document) -> Result<usize> {
        let mut cache = HashMap::new();
        let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
        for &page_id in &page_ids {
            self.append_page(source, page_id, &mut cache)?;
        }
        Ok(page_ids.len())
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Close the page tree and catalog
    pub fn finish(mut self) -> Document {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));

        self.output.trailer.set("Root", catalog_id);
        self.output
    }
}

impl Default for PageTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Page Copy
// =============================================================================

/// Copy a page into `output` under `parent_id`.
///
/// Inherited attributes are written onto the copy, since the source page
/// tree is left behind. A page without MediaBox gets US Letter and one
/// without Resources gets an empty dictionary.
fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let source_dict = source.get_dictionary(page_id)?;

    // Registered up front so annotations pointing back at the page (/P)
    // resolve to the copy instead of copying the page again
    let new_id = output.new_object_id();
    cache.insert(page_id, new_id);

    let mut page = Dictionary::new();
    for (key, value) in source_dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        page.set(key.clone(), copy_object_deep(output, source, value, cache));
    }

    for key in INHERITABLE_PAGE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_id, key) {
            let copied = copy_object_deep(output, source, value, cache);
            page.set(key.to_vec(), copied);
        }
    }

    if !page.has(b"MediaBox") {
        log::warn!("Page {:?} has no MediaBox, assuming US Letter", page_id);
        page.set("MediaBox", media_box_object(DEFAULT_MEDIA_BOX));
    }
    if !page.has(b"Resources") {
        page.set("Resources", Object::Dictionary(Dictionary::new()));
    }
    page.set("Parent", Object::Reference(parent_id));

    output.objects.insert(new_id, Object::Dictionary(page));
    Ok(new_id)
}

/// Deep copy an object from source to output document, following references.
///
/// References that do not resolve become `null` instead of failing the copy,
/// as do references to pages outside the copy (e.g. link destinations).
/// Target IDs are reserved before recursing, so reference cycles terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Object {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Object::Reference(new_id);
            }

            let referenced = match source.get_object(*id) {
                Ok(referenced) => referenced,
                Err(err) => {
                    log::warn!("Unresolvable reference {:?} replaced by null: {}", id, err);
                    return Object::Null;
                }
            };

            // Pages that are not being copied themselves are dropped rather
            // than dragging their whole page tree along
            if is_page_tree_node(referenced) {
                log::debug!("Dropping reference {:?} to a page outside the copy", id);
                return Object::Null;
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache);
            output.objects.insert(new_id, copied);

            Object::Reference(new_id)
        }
        Object::Dictionary(dict) => Object::Dictionary(copy_dictionary(output, source, dict, cache)),
        Object::Array(arr) => Object::Array(
            arr.iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect(),
        ),
        Object::Stream(stream) => {
            let dict = copy_dictionary(output, source, &stream.dict, cache);
            Object::Stream(Stream::new(dict, stream.content.clone()))
        }
        // Primitive types: just clone
        _ => obj.clone(),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache));
    }
    new_dict
}

fn is_page_tree_node(obj: &Object) -> bool {
    let Object::Dictionary(dict) = obj else {
        return false;
    };
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if name.as_slice() == b"Page" || name.as_slice() == b"Pages"
    )
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Look up `key` on a page or, failing that, on its page tree ancestors
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Resolve an object to a dictionary, following one reference
pub fn resolve_dictionary(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// MediaBox of a page as `[x0, y0, x1, y1]`, falling back to US Letter
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let parsed = inherited_attribute(doc, page_id, b"MediaBox").and_then(|obj| {
        let arr = match obj {
            Object::Array(arr) => arr.clone(),
            Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?.clone(),
            _ => return None,
        };
        if arr.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, value) in rect.iter_mut().zip(&arr) {
            *slot = extract_number(value)?;
        }
        Some(normalize_rect(rect))
    });

    parsed.unwrap_or_else(|| {
        log::debug!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
        DEFAULT_MEDIA_BOX
    })
}

/// Page rotation in degrees, normalized to 0, 90, 180 or 270
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    let raw = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    let normalized = raw.rem_euclid(360);
    if normalized % 90 != 0 {
        log::warn!("Page {:?} has invalid /Rotate {}, treating as 0", page_id, raw);
        return 0;
    }
    normalized
}

/// Order corners so that x0 <= x1 and y0 <= y1
fn normalize_rect([x0, y0, x1, y1]: [f32; 4]) -> [f32; 4] {
    [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
}

fn media_box_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Real(v)).collect())
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
