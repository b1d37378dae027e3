use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, Node, Path, TextNode, clamp_to_char_boundary};
use crate::error::PathError;

/// A boundary point. `offset` is a byte offset when `path` names a text node
/// and a child index when it names an element (or the document, for the empty path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn ordered(&self) -> (&Point, &Point) {
        if compare_points(&self.anchor, &self.focus) == Ordering::Greater {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.ordered().0
    }

    pub fn end(&self) -> &Point {
        self.ordered().1
    }

    pub fn common_ancestor(&self) -> Path {
        common_prefix(&self.anchor.path, &self.focus.path)
    }

    pub fn select_node_contents(doc: &Document, path: &[usize]) -> Result<Range, PathError> {
        let len = match doc.node(path) {
            Some(Node::Text(t)) => t.text.len(),
            _ => doc
                .children_at(path)
                .map(<[Node]>::len)
                .ok_or_else(|| PathError(format!("No node at {path:?}")))?,
        };
        Ok(Range::new(
            Point::new(path.to_vec(), 0),
            Point::new(path.to_vec(), len),
        ))
    }

    pub fn text(&self, doc: &Document) -> String {
        let (start, end) = self.ordered();
        let mut out = String::new();
        for (path, node) in text_nodes(doc, &[]) {
            let len = node.text.len();
            if len == 0 {
                continue;
            }
            if compare_points(&Point::new(path.clone(), len), start) != Ordering::Greater {
                continue;
            }
            if compare_points(&Point::new(path.clone(), 0), end) != Ordering::Less {
                continue;
            }
            let lo = if path == start.path { start.offset } else { 0 };
            let hi = if path == end.path { end.offset } else { len };
            let lo = clamp_to_char_boundary(&node.text, lo);
            let hi = clamp_to_char_boundary(&node.text, hi);
            if lo < hi {
                out.push_str(&node.text[lo..hi]);
            }
        }
        out
    }
}

pub(crate) fn common_prefix(a: &[usize], b: &[usize]) -> Path {
    a.iter()
        .zip(b)
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| *x)
        .collect()
}

/// Orders two boundary points the way the DOM does, treating an element
/// offset as the gap before that child.
pub fn compare_points(a: &Point, b: &Point) -> Ordering {
    let common = a
        .path
        .iter()
        .zip(&b.path)
        .take_while(|(x, y)| x == y)
        .count();
    let a_is_ancestor = a.path.len() == common;
    let b_is_ancestor = b.path.len() == common;
    match (a_is_ancestor, b_is_ancestor) {
        (true, true) => a.offset.cmp(&b.offset),
        (true, false) => {
            if a.offset <= b.path[common] {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if b.offset <= a.path[common] {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => a.path[common].cmp(&b.path[common]),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    last: Option<Range>,
}

impl SelectionStore {
    pub fn save(&mut self, live: Option<&Range>) {
        if let Some(range) = live {
            self.last = Some(range.clone());
        }
    }

    pub fn restore(&self, live: &mut Option<Range>) {
        if let Some(range) = &self.last {
            *live = Some(range.clone());
        }
    }

    pub fn last(&self) -> Option<&Range> {
        self.last.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct TextNodes<'a> {
    base: Path,
    path: Path,
    stack: Vec<(&'a [Node], usize)>,
    pending: Option<(Path, &'a TextNode)>,
}

pub fn text_nodes<'a>(doc: &'a Document, path: &[usize]) -> TextNodes<'a> {
    let mut walk = TextNodes {
        base: path.to_vec(),
        path: Vec::new(),
        stack: Vec::new(),
        pending: None,
    };
    match doc.node(path) {
        Some(Node::Text(t)) => walk.pending = Some((path.to_vec(), t)),
        _ => {
            if let Some(children) = doc.children_at(path) {
                walk.stack.push((children, 0));
            }
        }
    }
    walk
}

impl<'a> Iterator for TextNodes<'a> {
    type Item = (Path, &'a TextNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        loop {
            let (children, cursor) = self.stack.last_mut()?;
            let children: &'a [Node] = *children;
            let ix = *cursor;
            let Some(node) = children.get(ix) else {
                self.stack.pop();
                self.path.pop();
                continue;
            };
            *cursor += 1;
            match node {
                Node::Text(t) => {
                    let mut path = self.base.clone();
                    path.extend_from_slice(&self.path);
                    path.push(ix);
                    return Some((path, t));
                }
                Node::Element(el) => {
                    self.path.push(ix);
                    self.stack.push((&el.children, 0));
                }
            }
        }
    }
}
