use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::block::{
    IndentDirection, ListKind, align_text, format_block, indent, leading_int, toggle_list,
};
use crate::context::EditContext;
use crate::dom::{ElementNode, Path, Tag};
use crate::editor::Editor;
use crate::error::EditError;
use crate::inline::{
    InlineTag, apply_color, apply_font, apply_font_size, apply_highlight, apply_inline_style,
    apply_inline_tag,
};
use crate::link::insert_link;
use crate::locate::{anchor_element, nearest_block, nearest_list};
use crate::normalize::{remove_formatting, toggle_case};

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate command id: {0}")]
    DuplicateCommand(String),
    #[error("duplicate query id: {0}")]
    DuplicateQuery(String),
}

type CommandHandler = dyn Fn(&mut Editor, Option<Value>) -> Result<(), CommandError> + Send + Sync;
type QueryHandler = dyn Fn(&Editor, Option<Value>) -> Result<Value, QueryError> + Send + Sync;

#[derive(Clone)]
pub struct CommandSpec {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub args_example: Option<Value>,
    pub handler: Arc<CommandHandler>,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&mut Editor, Option<Value>) -> Result<(), CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            args_example: None,
            handler: Arc::new(handler),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn args_example(mut self, args_example: Value) -> Self {
        self.args_example = Some(args_example);
        self
    }
}

#[derive(Clone)]
pub struct QuerySpec {
    pub id: String,
    pub handler: Arc<QueryHandler>,
}

impl QuerySpec {
    pub fn new(
        id: impl Into<String>,
        handler: impl Fn(&Editor, Option<Value>) -> Result<Value, QueryError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }
}

pub trait HtmlEditPlugin: Send + Sync {
    fn id(&self) -> &'static str;
    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }
    fn queries(&self) -> Vec<QuerySpec> {
        Vec::new()
    }
}

#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
    queries: HashMap<String, QuerySpec>,
}

impl CommandRegistry {
    pub fn new(
        plugins: impl IntoIterator<Item = Box<dyn HtmlEditPlugin>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin.as_ref())?;
        }
        Ok(registry)
    }

    pub fn standard() -> Self {
        let plugins: Vec<Box<dyn HtmlEditPlugin>> = vec![
            Box::new(MarksPlugin),
            Box::new(StylePlugin),
            Box::new(LinkPlugin),
            Box::new(ListPlugin),
            Box::new(BlockPlugin),
            Box::new(TextPlugin),
            Box::new(SelectionPlugin),
        ];
        let mut registry = Self::default();
        for plugin in plugins {
            if let Err(err) = registry.register_plugin(plugin.as_ref()) {
                tracing::error!(plugin = plugin.id(), %err, "plugin registration failed");
            }
        }
        registry
    }

    pub fn register_plugin(&mut self, plugin: &dyn HtmlEditPlugin) -> Result<(), RegistryError> {
        let commands = plugin.commands();
        let queries = plugin.queries();

        for cmd in &commands {
            if self.commands.contains_key(&cmd.id) {
                return Err(RegistryError::DuplicateCommand(cmd.id.clone()));
            }
        }
        for query in &queries {
            if self.queries.contains_key(&query.id) {
                return Err(RegistryError::DuplicateQuery(query.id.clone()));
            }
        }

        for cmd in commands {
            self.commands.insert(cmd.id.clone(), cmd);
        }
        for query in queries {
            self.queries.insert(query.id.clone(), query);
        }
        Ok(())
    }

    pub fn commands(&self) -> &HashMap<String, CommandSpec> {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands.get(id).cloned()
    }

    pub fn queries(&self) -> &HashMap<String, QuerySpec> {
        &self.queries
    }

    pub fn query(&self, id: &str) -> Option<QuerySpec> {
        self.queries.get(id).cloned()
    }
}

fn run_edit(
    editor: &mut Editor,
    command: &str,
    op: impl FnOnce(&mut EditContext<'_>) -> Result<(), EditError>,
) -> Result<(), CommandError> {
    if let Err(err) = editor.edit(op) {
        tracing::debug!(command, %err, "command skipped");
    }
    Ok(())
}

fn str_arg<'a>(args: Option<&'a Value>, key: &str) -> Result<&'a str, CommandError> {
    args.and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::new(format!("Missing args.{key}")))
}

fn u32_arg(args: Option<&Value>, key: &str) -> Result<u32, CommandError> {
    args.and_then(|v| v.get(key))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CommandError::new(format!("Missing or invalid args.{key}")))
}

struct MarksPlugin;

impl HtmlEditPlugin for MarksPlugin {
    fn id(&self) -> &'static str {
        "marks"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        [
            ("marks.bold", "Bold", InlineTag::Bold),
            ("marks.italic", "Italic", InlineTag::Italic),
            ("marks.underline", "Underline", InlineTag::Underline),
            ("marks.strikethrough", "Strikethrough", InlineTag::Strikethrough),
            ("marks.superscript", "Superscript", InlineTag::Superscript),
            ("marks.subscript", "Subscript", InlineTag::Subscript),
        ]
        .into_iter()
        .map(|(id, label, tag)| {
            CommandSpec::new(id, label, move |editor, _args| {
                run_edit(editor, id, |cx| apply_inline_tag(cx, tag))
            })
            .description(format!("Wrap the selection in <{}>.", tag.tag()))
        })
        .collect()
    }
}

struct StylePlugin;

impl HtmlEditPlugin for StylePlugin {
    fn id(&self) -> &'static str {
        "style"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("style.apply", "Apply style", |editor, args| {
                let prop = str_arg(args.as_ref(), "prop")?.to_string();
                let value = str_arg(args.as_ref(), "value")?.to_string();
                run_edit(editor, "style.apply", |cx| {
                    apply_inline_style(cx, &prop, &value)
                })
            })
            .description("Wrap the selection in a span carrying one style property.")
            .args_example(serde_json::json!({ "prop": "color", "value": "red" })),
            CommandSpec::new("style.font", "Font", |editor, args| {
                let family = str_arg(args.as_ref(), "family")?.to_string();
                run_edit(editor, "style.font", |cx| apply_font(cx, &family))
            })
            .args_example(serde_json::json!({ "family": "Georgia" })),
            CommandSpec::new("style.color", "Text color", |editor, args| {
                let color = str_arg(args.as_ref(), "color")?.to_string();
                run_edit(editor, "style.color", |cx| apply_color(cx, &color))
            })
            .args_example(serde_json::json!({ "color": "#ff0000" })),
            CommandSpec::new("style.highlight", "Highlight", |editor, args| {
                let color = str_arg(args.as_ref(), "color")?.to_string();
                run_edit(editor, "style.highlight", |cx| apply_highlight(cx, &color))
            })
            .args_example(serde_json::json!({ "color": "#fff59d" })),
            CommandSpec::new("style.font_size", "Font size", |editor, args| {
                let px = u32_arg(args.as_ref(), "px")?;
                run_edit(editor, "style.font_size", |cx| apply_font_size(cx, px))
            })
            .args_example(serde_json::json!({ "px": 18 })),
        ]
    }
}

struct LinkPlugin;

impl HtmlEditPlugin for LinkPlugin {
    fn id(&self) -> &'static str {
        "link"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("link.insert", "Insert link", |editor, args| {
                let url = args
                    .as_ref()
                    .and_then(|v| v.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                run_edit(editor, "link.insert", |cx| {
                    let request = insert_link(cx)?;
                    request.complete(cx, url.as_deref())
                })
            })
            .description("Wrap the selection in a link to args.url.")
            .args_example(serde_json::json!({ "url": "https://example.com" })),
        ]
    }
}

struct ListPlugin;

impl HtmlEditPlugin for ListPlugin {
    fn id(&self) -> &'static str {
        "list"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("list.toggle_unordered", "Bulleted list", |editor, _args| {
                run_edit(editor, "list.toggle_unordered", |cx| {
                    toggle_list(cx, ListKind::Unordered)
                })
            }),
            CommandSpec::new("list.toggle_ordered", "Numbered list", |editor, _args| {
                run_edit(editor, "list.toggle_ordered", |cx| {
                    toggle_list(cx, ListKind::Ordered)
                })
            }),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![QuerySpec::new("list.active_tag", |editor, _args| {
            let tag = anchor_path(editor)
                .and_then(|path| nearest_list(editor.doc(), &path, editor.root()))
                .and_then(|path| editor.doc().element(&path).map(|el| el.tag.to_string()));
            Ok(serde_json::json!(tag))
        })]
    }
}

struct BlockPlugin;

impl HtmlEditPlugin for BlockPlugin {
    fn id(&self) -> &'static str {
        "block"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("block.indent", "Indent", |editor, _args| {
                run_edit(editor, "block.indent", |cx| {
                    indent(cx, IndentDirection::Indent)
                })
            }),
            CommandSpec::new("block.outdent", "Outdent", |editor, _args| {
                run_edit(editor, "block.outdent", |cx| {
                    indent(cx, IndentDirection::Outdent)
                })
            }),
            CommandSpec::new("block.align", "Align", |editor, args| {
                let align = str_arg(args.as_ref(), "align")?.to_string();
                run_edit(editor, "block.align", |cx| align_text(cx, &align))
            })
            .args_example(serde_json::json!({ "align": "center" })),
            CommandSpec::new("block.format", "Format block", |editor, args| {
                let tag = Tag::parse(str_arg(args.as_ref(), "tag")?);
                run_edit(editor, "block.format", |cx| format_block(cx, tag))
            })
            .description("Replace the current block with args.tag, keeping its content.")
            .args_example(serde_json::json!({ "tag": "h2" })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("block.active_tag", |editor, _args| {
                let tag = active_block(editor).map(|el| el.tag.to_string());
                Ok(serde_json::json!(tag))
            }),
            QuerySpec::new("block.margin_left", |editor, _args| {
                let margin = active_block(editor)
                    .and_then(|el| el.style_value("margin-left"))
                    .map(leading_int)
                    .unwrap_or(0);
                Ok(serde_json::json!(margin))
            }),
            QuerySpec::new("block.align", |editor, _args| {
                let align = active_block(editor).and_then(|el| el.style_value("text-align"));
                Ok(serde_json::json!(align))
            }),
        ]
    }
}

struct TextPlugin;

impl HtmlEditPlugin for TextPlugin {
    fn id(&self) -> &'static str {
        "text"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("text.toggle_case", "Toggle case", |editor, _args| {
                run_edit(editor, "text.toggle_case", toggle_case)
            }),
            CommandSpec::new(
                "text.remove_formatting",
                "Remove formatting",
                |editor, _args| run_edit(editor, "text.remove_formatting", remove_formatting),
            )
            .description("Replace the selection with plain text in a bare paragraph."),
        ]
    }
}

struct SelectionPlugin;

impl HtmlEditPlugin for SelectionPlugin {
    fn id(&self) -> &'static str {
        "selection"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("selection.save", "Save selection", |editor, _args| {
                editor.save_selection();
                Ok(())
            }),
            CommandSpec::new("selection.restore", "Restore selection", |editor, _args| {
                editor.restore_selection();
                Ok(())
            }),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("selection.is_collapsed", |editor, _args| {
                let collapsed = editor.selection().is_none_or(|range| range.is_collapsed());
                Ok(Value::Bool(collapsed))
            }),
            QuerySpec::new("selection.text", |editor, _args| {
                let text = editor
                    .selection()
                    .map(|range| range.text(editor.doc()))
                    .unwrap_or_default();
                Ok(Value::String(text))
            }),
        ]
    }
}

fn anchor_path(editor: &Editor) -> Option<Path> {
    let range = editor.selection()?;
    anchor_element(editor.doc(), &range.anchor, editor.root()).ok()
}

fn active_block(editor: &Editor) -> Option<&ElementNode> {
    let path = anchor_path(editor)?;
    let block = nearest_block(editor.doc(), &path, editor.root())?;
    editor.doc().element(&block)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Twice;

    impl HtmlEditPlugin for Twice {
        fn id(&self) -> &'static str {
            "twice"
        }

        fn commands(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("marks.bold", "Bold again", |_, _| Ok(()))]
        }
    }

    #[test]
    fn standard_registry_has_every_command() {
        let registry = CommandRegistry::standard();
        for id in [
            "marks.bold",
            "marks.subscript",
            "style.apply",
            "style.font_size",
            "link.insert",
            "list.toggle_ordered",
            "block.format",
            "text.remove_formatting",
            "selection.restore",
        ] {
            assert!(registry.command(id).is_some(), "missing {id}");
        }
        assert!(registry.query("block.margin_left").is_some());
        assert!(registry.query("list.active_tag").is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected_without_partial_registration() {
        let mut registry = CommandRegistry::standard();
        let before = registry.commands().len();
        let err = registry.register_plugin(&Twice).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCommand("marks.bold".into()));
        assert_eq!(registry.commands().len(), before);

        let plugins: Vec<Box<dyn HtmlEditPlugin>> = vec![Box::new(MarksPlugin), Box::new(Twice)];
        assert!(CommandRegistry::new(plugins).is_err());
    }

    #[test]
    fn missing_args_are_command_errors() {
        assert_eq!(
            str_arg(None, "align").unwrap_err().message(),
            "Missing args.align"
        );
        let args = serde_json::json!({ "px": -3 });
        assert!(u32_arg(Some(&args), "px").is_err());
    }
}
