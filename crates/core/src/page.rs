//! Page tree traversal.
//!
//! [`Document::pages`] walks `/Root → /Pages` depth-first, yielding pages in
//! document order with inherited attributes applied. Documents whose tree is
//! broken or missing fall back to scanning every object for `/Type /Page`.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::document::Document;
use crate::matrix::Rect;
use crate::object::{Dict, Object};

/// US Letter, the substitute for pages that lost their `/MediaBox`.
const MEDIABOX_LETTER: Rect = (0.0, 0.0, 612.0, 792.0);

/// One page, with inheritance already applied.
#[derive(Debug, Clone)]
pub struct Page {
    /// Object id of the page dict.
    pub id: u32,
    /// The page dict, including attributes pulled down from ancestors.
    pub attrs: Dict,
    /// Resolved `/Resources` dict (empty when absent).
    pub resources: Dict,
    /// Normalized `/MediaBox`: x0 < x1, y0 < y1.
    pub mediabox: Rect,
    /// `/Rotate` normalized into {0, 90, 180, 270}.
    pub rotate: i64,
    /// `/UserUnit` scale, default 1.0.
    pub user_unit: f64,
}

impl Page {
    fn from_attrs(id: u32, attrs: Dict, doc: &Document) -> Self {
        let mediabox = match parse_box(doc, &attrs, "MediaBox") {
            Some(rect) => rect,
            None => {
                warn!("page {id} has no /MediaBox, defaulting to US Letter");
                MEDIABOX_LETTER
            }
        };
        let rotate = doc
            .resolve_key(&attrs, "Rotate")
            .and_then(|r| r.as_i64().ok())
            .map(normalize_rotate)
            .unwrap_or(0);
        let user_unit = doc
            .resolve_key(&attrs, "UserUnit")
            .and_then(|u| u.as_f64().ok())
            .filter(|u| *u > 0.0)
            .unwrap_or(1.0);
        let resources = doc
            .resolve_key(&attrs, "Resources")
            .and_then(|r| r.as_dict().ok().cloned())
            .unwrap_or_default();

        Page {
            id,
            attrs,
            resources,
            mediabox,
            rotate,
            user_unit,
        }
    }

    /// Decoded content data: a single `/Contents` stream, or the members of
    /// a `/Contents` array joined with a newline so operators split across
    /// streams still tokenize.
    pub fn content_bytes(&self, doc: &Document) -> crate::error::Result<Vec<u8>> {
        let Some(contents) = doc.resolve_key(&self.attrs, "Contents") else {
            return Ok(Vec::new());
        };
        match contents {
            Object::Stream(stream) => doc.decode_stream(&stream),
            Object::Array(items) => {
                let mut data = Vec::new();
                for item in &items {
                    let Ok(resolved) = doc.resolve(item) else {
                        continue;
                    };
                    let Ok(stream) = resolved.as_stream() else {
                        continue;
                    };
                    let chunk = doc.decode_stream(stream)?;
                    if !data.is_empty() {
                        data.push(b'\n');
                    }
                    data.extend_from_slice(&chunk);
                }
                Ok(data)
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn normalize_rotate(r: i64) -> i64 {
    let r = ((r % 360) + 360) % 360;
    if r % 90 == 0 { r } else { 0 }
}

fn parse_box(doc: &Document, attrs: &Dict, key: &str) -> Option<Rect> {
    let resolved = doc.resolve_key(attrs, key)?;
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut v = [0f64; 4];
    for (slot, item) in v.iter_mut().zip(arr) {
        *slot = doc.resolve(item).ok()?.as_f64().ok()?;
    }
    Some((
        v[0].min(v[2]),
        v[1].min(v[3]),
        v[0].max(v[2]),
        v[1].max(v[3]),
    ))
}

/// Inheritable attributes, chained up the tree. Lookups walk toward the
/// root; the nearest definition wins.
#[derive(Debug)]
struct Inherited {
    parent: Option<Arc<Inherited>>,
    resources: Option<Object>,
    mediabox: Option<Object>,
    rotate: Option<Object>,
}

impl Inherited {
    fn from_dict(parent: Option<Arc<Inherited>>, dict: &Dict) -> Arc<Self> {
        Arc::new(Self {
            parent,
            resources: dict.get("Resources").cloned(),
            mediabox: dict.get("MediaBox").cloned(),
            rotate: dict.get("Rotate").cloned(),
        })
    }

    fn resources(&self) -> Option<&Object> {
        self.resources
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.resources()))
    }

    fn mediabox(&self) -> Option<&Object> {
        self.mediabox
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.mediabox()))
    }

    fn rotate(&self) -> Option<&Object> {
        self.rotate
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.rotate()))
    }

    /// Copies inherited values into a page dict, without overriding the
    /// page's own.
    fn apply_to(&self, dest: &mut Dict) {
        if !dest.contains_key("Resources")
            && let Some(val) = self.resources()
        {
            dest.insert("Resources".to_string(), val.clone());
        }
        if !dest.contains_key("MediaBox")
            && let Some(val) = self.mediabox()
        {
            dest.insert("MediaBox".to_string(), val.clone());
        }
        if !dest.contains_key("Rotate")
            && let Some(val) = self.rotate()
        {
            dest.insert("Rotate".to_string(), val.clone());
        }
    }
}

impl Document {
    /// Iterates the document's pages in document order.
    pub fn pages(&self) -> PageIter<'_> {
        PageIter::new(self)
    }
}

/// Depth-first page iterator with cycle protection.
pub struct PageIter<'a> {
    doc: &'a Document,
    stack: Vec<(u32, Arc<Inherited>)>,
    visited: FxHashSet<u32>,
    fallback: Option<std::vec::IntoIter<u32>>,
    yielded: bool,
}

impl<'a> PageIter<'a> {
    fn new(doc: &'a Document) -> Self {
        let catalog = doc.catalog();
        let stack = match catalog.get("Pages") {
            Some(Object::Reference(r)) => {
                vec![(r.id, Inherited::from_dict(None, catalog))]
            }
            _ => Vec::new(),
        };
        let fallback = stack
            .is_empty()
            .then(|| doc.object_ids().into_iter());
        PageIter {
            doc,
            stack,
            visited: FxHashSet::default(),
            fallback,
            yielded: false,
        }
    }
}

impl Iterator for PageIter<'_> {
    type Item = Page;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(ids) = &mut self.fallback {
            // Whole-file scan: any dict marked /Type /Page counts, in
            // object-id order.
            for id in ids {
                let Ok(obj) = self.doc.get_object(id) else {
                    continue;
                };
                if let Ok(dict) = obj.as_dict()
                    && let Some(Object::Name(tp)) = dict.get("Type")
                    && tp == "Page"
                {
                    return Some(Page::from_attrs(id, dict.clone(), self.doc));
                }
            }
            return None;
        }

        while let Some((id, parent)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Ok(obj) = self.doc.get_object(id) else {
                continue;
            };
            let Ok(dict) = obj.as_dict() else {
                continue;
            };

            let type_name = dict
                .get("Type")
                .or_else(|| dict.get("type"))
                .and_then(|t| t.as_name().ok());
            let branch = match type_name {
                Some("Pages") => true,
                Some("Page") => false,
                // Typeless nodes are classified by what they carry.
                None => dict.contains_key("Kids"),
                Some(_) => continue,
            };

            if branch {
                let inherited = Inherited::from_dict(Some(Arc::clone(&parent)), dict);
                if let Some(kids) = dict.get("Kids")
                    && let Ok(kids) = self.doc.resolve(kids)
                    && let Ok(kids) = kids.as_array()
                {
                    // Reverse push keeps the leftmost subtree on top.
                    for kid in kids.iter().rev() {
                        match kid {
                            Object::Reference(r) => {
                                self.stack.push((r.id, Arc::clone(&inherited)));
                            }
                            // Some writers store kid ids as plain integers.
                            Object::Integer(id) => {
                                if let Ok(id) = u32::try_from(*id) {
                                    self.stack.push((id, Arc::clone(&inherited)));
                                }
                            }
                            _ => {}
                        }
                    }
                }
            } else {
                let mut attrs = dict.clone();
                parent.apply_to(&mut attrs);
                self.yielded = true;
                return Some(Page::from_attrs(id, attrs, self.doc));
            }
        }

        // A tree that yielded nothing at all gets the whole-file scan.
        if !self.yielded && self.fallback.is_none() {
            self.fallback = Some(self.doc.object_ids().into_iter());
            return self.next();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherited_fills_missing_only() {
        let root = Dict::from([
            ("MediaBox".to_string(), Object::Name("root".to_string())),
            ("Rotate".to_string(), Object::Integer(90)),
        ]);
        let mid = Dict::from([(
            "Resources".to_string(),
            Object::Name("mid".to_string()),
        )]);
        let root_node = Inherited::from_dict(None, &root);
        let mid_node = Inherited::from_dict(Some(root_node), &mid);

        let mut leaf = Dict::from([(
            "Resources".to_string(),
            Object::Name("leaf".to_string()),
        )]);
        mid_node.apply_to(&mut leaf);

        assert_eq!(leaf["Resources"], Object::Name("leaf".to_string()));
        assert_eq!(leaf["MediaBox"], Object::Name("root".to_string()));
        assert_eq!(leaf["Rotate"], Object::Integer(90));
    }

    #[test]
    fn test_normalize_rotate() {
        assert_eq!(normalize_rotate(0), 0);
        assert_eq!(normalize_rotate(90), 90);
        assert_eq!(normalize_rotate(-90), 270);
        assert_eq!(normalize_rotate(450), 90);
        assert_eq!(normalize_rotate(-720), 0);
        // Junk angles fall back to unrotated.
        assert_eq!(normalize_rotate(45), 0);
    }
}
