use serde::{Deserialize, Serialize};

use crate::context::EditContext;
use crate::dom::{Document, ElementNode, Node, Path, Tag};
use crate::error::EditError;
use crate::notify::Notice;
use crate::range::{extract_contents, insert_node};
use crate::selection::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineTag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
}

impl InlineTag {
    pub fn tag(self) -> Tag {
        match self {
            InlineTag::Bold => Tag::B,
            InlineTag::Italic => Tag::I,
            InlineTag::Underline => Tag::U,
            InlineTag::Strikethrough => Tag::S,
            InlineTag::Superscript => Tag::Sup,
            InlineTag::Subscript => Tag::Sub,
        }
    }

    fn missing_selection_notice(self) -> Option<Notice> {
        match self {
            InlineTag::Superscript | InlineTag::Subscript => {
                Some(Notice::ScriptSelectionRequired)
            }
            _ => None,
        }
    }
}

pub fn apply_inline_style(
    cx: &mut EditContext<'_>,
    prop: &str,
    value: &str,
) -> Result<(), EditError> {
    let range = cx.expanded_range(Some(Notice::StyleSelectionRequired))?;
    let wrapper = ElementNode::new(Tag::Span).with_style(prop, value);
    wrap_and_select(cx, &range, wrapper)
}

pub fn apply_inline_tag(cx: &mut EditContext<'_>, tag: InlineTag) -> Result<(), EditError> {
    let range = cx.expanded_range(tag.missing_selection_notice())?;
    wrap_and_select(cx, &range, ElementNode::new(tag.tag()))
}

pub fn apply_font(cx: &mut EditContext<'_>, family: &str) -> Result<(), EditError> {
    apply_inline_style(cx, "font-family", family)
}

pub fn apply_color(cx: &mut EditContext<'_>, color: &str) -> Result<(), EditError> {
    apply_inline_style(cx, "color", color)
}

pub fn apply_highlight(cx: &mut EditContext<'_>, color: &str) -> Result<(), EditError> {
    apply_inline_style(cx, "background-color", color)
}

pub fn apply_font_size(cx: &mut EditContext<'_>, px: u32) -> Result<(), EditError> {
    apply_inline_style(cx, "font-size", &format!("{px}px"))
}

fn wrap_and_select(
    cx: &mut EditContext<'_>,
    range: &Range,
    wrapper: ElementNode,
) -> Result<(), EditError> {
    let (doc, path) = wrap_range(cx, range, wrapper)?;
    let selection = Range::select_node_contents(&doc, &path)?;
    tracing::trace!(?path, "wrapped selection");
    cx.commit(doc, selection);
    Ok(())
}

pub(crate) fn wrap_range(
    cx: &EditContext<'_>,
    range: &Range,
    mut wrapper: ElementNode,
) -> Result<(Document, Path), EditError> {
    cx.ensure_in_root(range)?;
    let mut doc = cx.doc.clone();
    let (fragment, at) = extract_contents(&mut doc, range)?;
    wrapper.children = fragment.into_nodes();
    let path = insert_node(&mut doc, &at, Node::Element(wrapper))?;
    Ok((doc, path))
}
