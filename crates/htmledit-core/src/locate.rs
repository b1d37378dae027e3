use serde::{Deserialize, Serialize};

use crate::dom::{Document, Path, Tag, element_path};
use crate::error::EditError;
use crate::selection::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSet {
    Block,
    List,
}

impl TagSet {
    pub fn contains(self, tag: &Tag) -> bool {
        match self {
            TagSet::Block => matches!(
                tag,
                Tag::P
                    | Tag::Div
                    | Tag::H1
                    | Tag::H2
                    | Tag::H3
                    | Tag::H4
                    | Tag::H5
                    | Tag::H6
                    | Tag::Li
            ),
            TagSet::List => matches!(tag, Tag::Ul | Tag::Ol),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableRoot {
    path: Path,
}

impl EditableRoot {
    pub fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn document() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn contains(&self, path: &[usize]) -> bool {
        path.len() > self.path.len() && path.starts_with(&self.path)
    }

    pub fn contains_or_is(&self, path: &[usize]) -> bool {
        path.starts_with(&self.path)
    }
}

/// Walks from `path` (inclusive) towards the root and returns the first
/// element whose tag is in `tags`. The root itself is never returned.
pub fn nearest_of_tags(
    doc: &Document,
    path: &[usize],
    root: &EditableRoot,
    tags: TagSet,
) -> Option<Path> {
    if !root.contains(path) || doc.node(path).is_none() {
        return None;
    }
    let mut current = path;
    while current.len() > root.path().len() {
        if doc.element(current).is_some_and(|el| tags.contains(&el.tag)) {
            return Some(current.to_vec());
        }
        current = &current[..current.len() - 1];
    }
    None
}

pub fn nearest_block(doc: &Document, path: &[usize], root: &EditableRoot) -> Option<Path> {
    nearest_of_tags(doc, path, root, TagSet::Block)
}

pub fn nearest_list(doc: &Document, path: &[usize], root: &EditableRoot) -> Option<Path> {
    nearest_of_tags(doc, path, root, TagSet::List)
}

pub(crate) fn anchor_element(
    doc: &Document,
    point: &Point,
    root: &EditableRoot,
) -> Result<Path, EditError> {
    if !point.path.is_empty() && doc.node(&point.path).is_none() {
        return Err(EditError::InvalidPath(format!(
            "No node at {:?}",
            point.path
        )));
    }
    let path = element_path(doc, &point.path);
    if !root.contains(&path) {
        return Err(EditError::OutsideRoot);
    }
    Ok(path)
}
