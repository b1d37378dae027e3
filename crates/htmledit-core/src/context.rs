use crate::config::EditorConfig;
use crate::dom::Document;
use crate::error::EditError;
use crate::locate::EditableRoot;
use crate::notify::{Notice, Notifier};
use crate::selection::Range;

pub struct EditContext<'a> {
    pub doc: &'a mut Document,
    pub selection: &'a mut Option<Range>,
    pub root: &'a EditableRoot,
    pub config: &'a EditorConfig,
    pub notifier: &'a mut dyn Notifier,
}

impl<'a> EditContext<'a> {
    pub fn new(
        doc: &'a mut Document,
        selection: &'a mut Option<Range>,
        root: &'a EditableRoot,
        config: &'a EditorConfig,
        notifier: &'a mut dyn Notifier,
    ) -> Self {
        Self {
            doc,
            selection,
            root,
            config,
            notifier,
        }
    }

    pub fn range(&self) -> Result<&Range, EditError> {
        self.selection.as_ref().ok_or(EditError::NoSelection)
    }

    /// The live range when it covers something. Otherwise raises `notice`
    /// (when given) and fails.
    pub fn expanded_range(&mut self, notice: Option<Notice>) -> Result<Range, EditError> {
        let err = match self.selection.as_ref() {
            Some(range) if !range.is_collapsed() => return Ok(range.clone()),
            Some(_) => EditError::CollapsedSelection,
            None => EditError::NoSelection,
        };
        if let Some(notice) = notice {
            self.notifier.notify(notice);
        }
        Err(err)
    }

    pub(crate) fn ensure_in_root(&self, range: &Range) -> Result<(), EditError> {
        if self.root.contains_or_is(&range.common_ancestor()) {
            Ok(())
        } else {
            Err(EditError::OutsideRoot)
        }
    }

    pub(crate) fn commit(&mut self, doc: Document, selection: Range) {
        *self.doc = doc;
        *self.selection = Some(selection);
    }
}
