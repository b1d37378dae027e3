use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::EditorConfig;
use crate::context::EditContext;
use crate::dom::Document;
use crate::error::EditError;
use crate::locate::EditableRoot;
use crate::notify::{NoticeLog, Notifier};
use crate::plugin::{CommandError, CommandRegistry, QueryError};
use crate::selection::{Range, SelectionStore};

pub struct Editor {
    doc: Document,
    selection: Option<Range>,
    store: SelectionStore,
    root: EditableRoot,
    config: EditorConfig,
    notifier: Box<dyn Notifier>,
    registry: CommandRegistry,
}

impl Editor {
    pub fn new(doc: Document, root: EditableRoot, registry: CommandRegistry) -> Self {
        Self {
            doc,
            selection: None,
            store: SelectionStore::default(),
            root,
            config: EditorConfig::default(),
            notifier: Box::new(NoticeLog::default()),
            registry,
        }
    }

    pub fn with_standard_plugins(doc: Document) -> Self {
        Self::new(doc, EditableRoot::document(), CommandRegistry::standard())
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config.with_defaults();
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Range>) {
        self.selection = selection;
    }

    pub fn select(&mut self, range: Range) {
        self.selection = Some(range);
    }

    pub fn root(&self) -> &EditableRoot {
        &self.root
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn context(&mut self) -> EditContext<'_> {
        EditContext::new(
            &mut self.doc,
            &mut self.selection,
            &self.root,
            &self.config,
            &mut *self.notifier,
        )
    }

    pub fn edit<T>(
        &mut self,
        op: impl FnOnce(&mut EditContext<'_>) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let mut cx = self.context();
        op(&mut cx)
    }

    pub fn save_selection(&mut self) {
        self.store.save(self.selection.as_ref());
    }

    pub fn restore_selection(&mut self) {
        self.store.restore(&mut self.selection);
    }

    /// Runs a registered command. Edits that decline to run (no selection,
    /// nothing selected, outside the editable root, ...) still return `Ok`.
    pub fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let Some(command) = self.registry.command(id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        (command.handler)(self, args)
    }

    pub fn run_query_json(&self, id: &str, args: Option<Value>) -> Result<Value, QueryError> {
        let Some(query) = self.registry.query(id) else {
            return Err(QueryError::new(format!("Unknown query: {id}")));
        };
        (query.handler)(self, args)
    }

    pub fn run_query<T>(&self, id: &str, args: Option<Value>) -> Result<T, QueryError>
    where
        T: DeserializeOwned,
    {
        let value = self.run_query_json(id, args)?;
        serde_json::from_value(value)
            .map_err(|err| QueryError::new(format!("Failed to decode query result: {err}")))
    }
}
