//! Operations that flatten the selection to plain text.

use crate::context::EditContext;
use crate::dom::{Node, Tag, element_path};
use crate::error::EditError;
use crate::locate::nearest_block;
use crate::range::{extract_contents, insert_node};
use crate::selection::Range;

/// Upper-cases the selection when lower-case letters are at least as common
/// as upper-case ones, and lower-cases it otherwise. Inline formatting inside
/// the selection is lost.
pub fn toggle_case(cx: &mut EditContext<'_>) -> Result<(), EditError> {
    let range = cx.expanded_range(None)?;
    cx.ensure_in_root(&range)?;

    let mut doc = cx.doc.clone();
    let (fragment, at) = extract_contents(&mut doc, &range)?;
    let text = fragment.text_content();
    if text.is_empty() {
        return Err(EditError::EmptyText);
    }

    let replacement = flip_majority_case(&text);
    let path = insert_node(&mut doc, &at, Node::text(replacement))?;
    let selection = Range::select_node_contents(&doc, &path)?;
    cx.commit(doc, selection);
    Ok(())
}

/// Replaces the selection with its plain text, rebuilding the surrounding
/// block as a bare paragraph. A list item becomes a paragraph before its
/// list, and a list left without items goes away with it.
pub fn remove_formatting(cx: &mut EditContext<'_>) -> Result<(), EditError> {
    let range = cx.expanded_range(None)?;
    cx.ensure_in_root(&range)?;

    let mut doc = cx.doc.clone();
    let (fragment, at) = extract_contents(&mut doc, &range)?;
    let text = fragment.text_content();
    if text.is_empty() {
        return Err(EditError::EmptyText);
    }

    let container = element_path(&doc, &at.path);
    let Some(block) = nearest_block(&doc, &container, cx.root) else {
        tracing::trace!(?at, "no block; inserting plain text in place");
        let path = insert_node(&mut doc, &at, Node::text(text))?;
        let selection = Range::select_node_contents(&doc, &path)?;
        cx.commit(doc, selection);
        return Ok(());
    };

    let paragraph = Node::paragraph(text);
    let is_item = doc.element(&block).is_some_and(|el| el.tag == Tag::Li);
    let list = &block[..block.len() - 1];
    let in_list = is_item
        && cx.root.contains(list)
        && doc
            .element(list)
            .is_some_and(|el| matches!(el.tag, Tag::Ul | Tag::Ol));

    let paragraph_path = if in_list {
        let single = doc
            .element(list)
            .is_some_and(|el| el.element_child_count() == 1);
        if single {
            doc.replace_node(list, paragraph)?;
        } else {
            doc.remove_node(&block)?;
            doc.insert_node(list, paragraph)?;
        }
        list.to_vec()
    } else {
        doc.replace_node(&block, paragraph)?;
        block.clone()
    };

    tracing::trace!(?block, ?paragraph_path, "formatting removed");
    let selection = Range::select_node_contents(&doc, &paragraph_path)?;
    cx.commit(doc, selection);
    Ok(())
}

fn flip_majority_case(text: &str) -> String {
    let lower = text.chars().filter(|c| c.is_lowercase()).count();
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    if lower >= upper {
        text.to_uppercase()
    } else {
        text.to_lowercase()
    }
}
