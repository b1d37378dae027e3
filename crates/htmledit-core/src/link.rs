use crate::context::EditContext;
use crate::dom::{ElementNode, Tag};
use crate::error::{EditError, PathError};
use crate::inline::wrap_range;
use crate::notify::Notice;
use crate::selection::{Point, Range};

/// A pending link insertion. The host asks the user for a URL, then calls
/// [`LinkRequest::complete`] with the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct LinkRequest {
    range: Range,
}

pub fn insert_link(cx: &mut EditContext<'_>) -> Result<LinkRequest, EditError> {
    let range = cx.expanded_range(Some(Notice::LinkSelectionRequired))?;
    cx.ensure_in_root(&range)?;
    Ok(LinkRequest { range })
}

impl LinkRequest {
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Wraps the captured range in an anchor and puts the caret right after
    /// it. A missing URL, an empty one, or the untouched placeholder cancels.
    pub fn complete(self, cx: &mut EditContext<'_>, url: Option<&str>) -> Result<(), EditError> {
        let url = url
            .filter(|url| !url.is_empty() && *url != cx.config.link_placeholder)
            .ok_or(EditError::Cancelled)?;

        let anchor = ElementNode::new(Tag::A)
            .with_attr("href", url)
            .with_attr("target", cx.config.link_target.as_str())
            .with_attr("rel", cx.config.link_rel.as_str());
        let (doc, path) = wrap_range(cx, &self.range, anchor)?;
        let (&ix, parent) = path
            .split_last()
            .ok_or_else(|| PathError("Link inserted at the document itself".into()))?;
        let caret = Point::new(parent.to_vec(), ix + 1);
        cx.commit(doc, Range::collapsed(caret));
        Ok(())
    }
}
