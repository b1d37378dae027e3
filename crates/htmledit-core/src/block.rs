use serde::{Deserialize, Serialize};

use crate::context::EditContext;
use crate::dom::{Document, ElementNode, Node, Path, Tag, element_path};
use crate::error::EditError;
use crate::locate::{anchor_element, nearest_block, nearest_list};
use crate::selection::{Point, Range};

const MARGIN_LEFT: &str = "margin-left";
const TEXT_ALIGN: &str = "text-align";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> Tag {
        match self {
            ListKind::Unordered => Tag::Ul,
            ListKind::Ordered => Tag::Ol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentDirection {
    Indent,
    Outdent,
}

/// Unwraps the list around the selection into paragraphs, or turns the
/// selection's block into a one-item list of `kind`.
///
/// Unwrapping always converts the whole list, whatever its kind.
pub fn toggle_list(cx: &mut EditContext<'_>, kind: ListKind) -> Result<(), EditError> {
    let range = cx.range()?.clone();
    let anchor = anchor_element(cx.doc, &range.anchor, cx.root)?;

    let mut doc = cx.doc.clone();
    let remap: Box<dyn Fn(&Point) -> Point> =
        if let Some(list) = nearest_list(&doc, &anchor, cx.root) {
            tracing::trace!(?list, "unwrapping list");
            Box::new(unwrap_list(&mut doc, &list)?)
        } else {
            let block = nearest_block(&doc, &anchor, cx.root).ok_or(EditError::NoBlock)?;
            tracing::trace!(?block, "wrapping block in list");
            let inner = doc
                .element(&block)
                .map(ElementNode::inner_content)
                .unwrap_or_default();
            let item = Node::element(Tag::Li, inner);
            doc.replace_node(&block, Node::element(kind.tag(), vec![item]))?;
            Box::new(move |point: &Point| nest_point(point, &block))
        };

    let selection = Range::new(remap(&range.anchor), remap(&range.focus));
    cx.commit(doc, selection);
    Ok(())
}

fn unwrap_list(
    doc: &mut Document,
    list: &[usize],
) -> Result<impl Fn(&Point) -> Point + 'static, EditError> {
    let (&list_ix, parent) = list
        .split_last()
        .ok_or_else(|| EditError::InvalidPath("List at the document itself".into()))?;
    let parent = parent.to_vec();
    let list = list.to_vec();

    let old_children: Vec<Node> = doc.children_at(&list).map(<[Node]>::to_vec).unwrap_or_default();
    // Slot of each old child among the new paragraphs; non-items are dropped.
    let mut slots: Vec<Option<usize>> = Vec::with_capacity(old_children.len());
    let mut paragraphs = Vec::new();
    for child in &old_children {
        match child.as_element() {
            Some(el) if el.tag == Tag::Li => {
                slots.push(Some(paragraphs.len()));
                paragraphs.push(Node::element(Tag::P, el.inner_content()));
            }
            _ => slots.push(None),
        }
    }

    let count = paragraphs.len();
    doc.remove_node(&list)?;
    let siblings = doc.children_mut(&parent)?;
    for (k, paragraph) in paragraphs.into_iter().enumerate() {
        siblings.insert(list_ix + k, paragraph);
    }

    Ok(move |point: &Point| {
        let depth = parent.len();
        if point.path.len() > list.len() && point.path.starts_with(&list) {
            if let Some(Some(slot)) = slots.get(point.path[list.len()]) {
                let mut path = parent.clone();
                path.push(list_ix + slot);
                path.extend_from_slice(&point.path[list.len() + 1..]);
                return Point::new(path, point.offset);
            }
        } else if point.path.starts_with(&parent) && point.path != list {
            if point.path.len() == depth {
                let offset = if point.offset > list_ix {
                    (point.offset + count).saturating_sub(1)
                } else {
                    point.offset
                };
                return Point::new(point.path.clone(), offset);
            }
            let mut path = point.path.clone();
            if path[depth] > list_ix {
                path[depth] = (path[depth] + count).saturating_sub(1);
            }
            return Point::new(path, point.offset);
        } else if !point.path.starts_with(&parent) {
            return point.clone();
        }

        if count > 0 {
            let mut path = parent.clone();
            path.push(list_ix);
            Point::new(path, 0)
        } else {
            Point::new(parent.clone(), list_ix)
        }
    })
}

fn nest_point(point: &Point, block: &Path) -> Point {
    if !point.path.starts_with(block) {
        return point.clone();
    }
    let mut path = block.clone();
    path.push(0);
    path.extend_from_slice(&point.path[block.len()..]);
    Point::new(path, point.offset)
}

/// Moves the selection's block by one `indent_step` of left margin. Outdent
/// stops at zero and then drops the margin altogether.
pub fn indent(cx: &mut EditContext<'_>, direction: IndentDirection) -> Result<(), EditError> {
    let block = anchor_block(cx)?;
    let step = i64::from(cx.config.indent_step);
    let el = cx.doc.element_mut(&block)?;
    let current = el.style_value(MARGIN_LEFT).map(leading_int).unwrap_or(0);
    let next = match direction {
        IndentDirection::Indent => current.saturating_add(step),
        IndentDirection::Outdent => current.saturating_sub(step).max(0),
    };
    tracing::trace!(?block, current, next, "indent");
    if next == 0 && direction == IndentDirection::Outdent {
        el.style.remove(MARGIN_LEFT);
    } else {
        el.style.insert(MARGIN_LEFT.to_string(), format!("{next}px"));
    }
    Ok(())
}

pub fn outdent(cx: &mut EditContext<'_>) -> Result<(), EditError> {
    indent(cx, IndentDirection::Outdent)
}

pub fn align_text(cx: &mut EditContext<'_>, align: &str) -> Result<(), EditError> {
    let block = anchor_block(cx)?;
    let el = cx.doc.element_mut(&block)?;
    el.style.insert(TEXT_ALIGN.to_string(), align.to_string());
    Ok(())
}

/// Replaces the block around the selection with a `tag` element holding the
/// same children, and collapses the selection at its end.
pub fn format_block(cx: &mut EditContext<'_>, tag: Tag) -> Result<(), EditError> {
    let range = cx.range()?;
    let container = element_path(cx.doc, &range.common_ancestor());
    let block = nearest_block(cx.doc, &container, cx.root).ok_or(EditError::NoBlock)?;
    let inner = cx
        .doc
        .element(&block)
        .map(ElementNode::inner_content)
        .ok_or(EditError::NoBlock)?;
    let len = inner.len();

    tracing::trace!(?block, %tag, "format block");
    cx.doc.replace_node(&block, Node::element(tag, inner))?;
    *cx.selection = Some(Range::collapsed(Point::new(block, len)));
    Ok(())
}

fn anchor_block(cx: &EditContext<'_>) -> Result<Path, EditError> {
    let range = cx.range()?;
    let anchor = anchor_element(cx.doc, &range.anchor, cx.root)?;
    nearest_block(cx.doc, &anchor, cx.root).ok_or(EditError::NoBlock)
}

pub(crate) fn leading_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => (-1, &value[1..]),
        Some(b'+') => (1, &value[1..]),
        _ => (1, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}
