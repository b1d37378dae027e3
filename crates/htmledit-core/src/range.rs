//! Tree edits driven by boundary points: extracting the content a range
//! spans and inserting a node at a point.

use crate::dom::{Document, Node, Path, clamp_to_char_boundary};
use crate::error::PathError;
use crate::selection::{Point, Range, common_prefix};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound<'p> {
    Gap(usize),
    Inside {
        child: usize,
        rest: &'p [usize],
        offset: usize,
    },
}

impl<'p> Bound<'p> {
    fn below(rest: &'p [usize], offset: usize) -> Self {
        match rest.split_first() {
            None => Bound::Gap(offset),
            Some((&child, rest)) => Bound::Inside {
                child,
                rest,
                offset,
            },
        }
    }
}

/// Removes everything the range covers and returns it with the collapsed
/// point the range ends up at.
///
/// Text nodes cut by an endpoint are split. Elements cut by an endpoint stay
/// in the tree with their unselected children, and a childless copy of them
/// carries the selected children into the fragment.
pub fn extract_contents(doc: &mut Document, range: &Range) -> Result<(Fragment, Point), PathError> {
    let (start, end) = range.ordered();
    let (start, end) = (start.clone(), end.clone());

    if start == end {
        return Ok((Fragment::default(), start));
    }

    if start.path == end.path && doc.is_text(&start.path) {
        let Node::Text(t) = doc.node_mut(&start.path)? else {
            return Err(PathError(format!("Expected text node at {:?}", start.path)));
        };
        let lo = clamp_to_char_boundary(&t.text, start.offset);
        let hi = clamp_to_char_boundary(&t.text, end.offset).max(lo);
        let cut: String = t.text.drain(lo..hi).collect();
        return Ok((
            Fragment {
                nodes: vec![Node::text(cut)],
            },
            Point::new(start.path, lo),
        ));
    }

    for point in [&start, &end] {
        if !point.path.is_empty() && doc.node(&point.path).is_none() {
            return Err(PathError(format!("No node at {:?}", point.path)));
        }
    }

    let common = common_prefix(&start.path, &end.path);
    let depth = common.len();
    let start_bound = Bound::below(&start.path[depth..], start.offset);
    let end_bound = Bound::below(&end.path[depth..], end.offset);

    let children = doc.children_mut(&common)?;
    let collapsed_offset = match start_bound {
        Bound::Gap(offset) => offset.min(children.len()),
        Bound::Inside { child, .. } => child + 1,
    };
    let nodes = extract_children(children, start_bound, end_bound)?;

    Ok((Fragment { nodes }, Point::new(common, collapsed_offset)))
}

pub fn delete_contents(doc: &mut Document, range: &Range) -> Result<Point, PathError> {
    extract_contents(doc, range).map(|(_, point)| point)
}

/// Inserts `node` at `point` and returns its path.
///
/// Inside a text node the text is split at the offset; at either end of the
/// text the node goes before or after it without a split.
pub fn insert_node(doc: &mut Document, point: &Point, node: Node) -> Result<Path, PathError> {
    if let Some(Node::Text(t)) = doc.node(&point.path) {
        let offset = clamp_to_char_boundary(&t.text, point.offset);
        let len = t.text.len();
        let (&ix, parent) = point
            .path
            .split_last()
            .ok_or_else(|| PathError("Text node without a parent".into()))?;
        let mut path = parent.to_vec();

        if offset == 0 {
            path.push(ix);
            doc.insert_node(&path, node)?;
            return Ok(path);
        }
        if offset < len {
            let Node::Text(t) = doc.node_mut(&point.path)? else {
                return Err(PathError(format!("Expected text node at {:?}", point.path)));
            };
            let tail = t.text.split_off(offset);
            path.push(ix + 1);
            doc.insert_node(&path, Node::text(tail))?;
        } else {
            path.push(ix + 1);
        }
        doc.insert_node(&path, node)?;
        return Ok(path);
    }

    let children = doc.children_mut(&point.path)?;
    let ix = point.offset.min(children.len());
    children.insert(ix, node);
    let mut path = point.path.clone();
    path.push(ix);
    Ok(path)
}

fn extract_children(
    children: &mut Vec<Node>,
    start: Bound<'_>,
    end: Bound<'_>,
) -> Result<Vec<Node>, PathError> {
    let len = children.len();
    let first_whole = match start {
        Bound::Gap(offset) => offset.min(len),
        Bound::Inside { child, .. } => child + 1,
    };
    let last_whole = match end {
        Bound::Gap(offset) => offset.min(len),
        Bound::Inside { child, .. } => child.min(len),
    };

    let mut out = Vec::new();

    if let Bound::Inside {
        child,
        rest,
        offset,
    } = start
    {
        let node = children
            .get_mut(child)
            .ok_or_else(|| PathError(format!("Start child {child} out of bounds")))?;
        out.push(split_tail(node, rest, offset)?);
    }

    let drained = if first_whole < last_whole {
        out.extend(children.drain(first_whole..last_whole));
        last_whole - first_whole
    } else {
        0
    };

    if let Bound::Inside {
        child,
        rest,
        offset,
    } = end
    {
        let ix = child - drained;
        let node = children
            .get_mut(ix)
            .ok_or_else(|| PathError(format!("End child {child} out of bounds")))?;
        out.push(split_head(node, rest, offset)?);
    }

    Ok(out)
}

fn split_tail(node: &mut Node, rest: &[usize], offset: usize) -> Result<Node, PathError> {
    match node {
        Node::Text(t) if rest.is_empty() => {
            let offset = clamp_to_char_boundary(&t.text, offset);
            Ok(Node::text(t.text.split_off(offset)))
        }
        Node::Text(_) => Err(PathError("Path continues below a text node".into())),
        Node::Element(el) => {
            let len = el.children.len();
            let mut copy = el.shell();
            copy.children =
                extract_children(&mut el.children, Bound::below(rest, offset), Bound::Gap(len))?;
            Ok(Node::Element(copy))
        }
    }
}

fn split_head(node: &mut Node, rest: &[usize], offset: usize) -> Result<Node, PathError> {
    match node {
        Node::Text(t) if rest.is_empty() => {
            let offset = clamp_to_char_boundary(&t.text, offset);
            let head: String = t.text.drain(..offset).collect();
            Ok(Node::text(head))
        }
        Node::Text(_) => Err(PathError("Path continues below a text node".into())),
        Node::Element(el) => {
            let mut copy = el.shell();
            copy.children =
                extract_children(&mut el.children, Bound::Gap(0), Bound::below(rest, offset))?;
            Ok(Node::Element(copy))
        }
    }
}
