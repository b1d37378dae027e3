use std::cell::RefCell;
use std::rc::Rc;

use gpui_htmledit_core::markup::parse_fragment;
use gpui_htmledit_core::{
    EditError, Editor, EditableRoot, CommandRegistry, InlineTag, Notice, Point, Range,
    apply_inline_tag,
};

fn range(anchor: &[usize], anchor_offset: usize, focus: &[usize], focus_offset: usize) -> Range {
    Range::new(
        Point::new(anchor.to_vec(), anchor_offset),
        Point::new(focus.to_vec(), focus_offset),
    )
}

fn editor(markup: &str, selection: Range) -> (Editor, Rc<RefCell<Vec<Notice>>>) {
    let notices = Rc::new(RefCell::new(Vec::new()));
    let sink = notices.clone();
    let mut editor = Editor::with_standard_plugins(parse_fragment(markup))
        .with_notifier(move |notice| sink.borrow_mut().push(notice));
    editor.select(selection);
    (editor, notices)
}

#[test]
fn bold_wraps_selection_and_selects_wrapper_contents() {
    let (mut editor, notices) = editor("<p>abcde</p>", range(&[0, 0], 1, &[0, 0], 3));

    editor.run_command("marks.bold", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>a<b>bc</b>de</p>");
    assert_eq!(editor.selection(), Some(&range(&[0, 1], 0, &[0, 1], 1)));
    assert!(notices.borrow().is_empty());
}

#[test]
fn repeated_tags_nest_instead_of_merging() {
    let (mut editor, _) = editor("<p>abcde</p>", range(&[0, 0], 1, &[0, 0], 3));

    editor.run_command("marks.bold", None).unwrap();
    editor.run_command("marks.italic", None).unwrap();
    editor.run_command("marks.bold", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p>a<b><i><b>bc</b></i></b>de</p>"
    );
    assert_eq!(
        editor.selection(),
        Some(&range(&[0, 1, 0, 0], 0, &[0, 1, 0, 0], 1))
    );
}

#[test]
fn style_wraps_selection_in_span() {
    let (mut editor, _) = editor("<p>hello world</p>", range(&[0, 0], 0, &[0, 0], 5));

    editor
        .run_command("style.color", Some(serde_json::json!({ "color": "red" })))
        .unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p><span style=\"color: red\">hello</span> world</p>"
    );
    assert_eq!(editor.selection(), Some(&range(&[0, 0], 0, &[0, 0], 1)));
}

#[test]
fn style_helpers_write_their_properties() {
    let (mut editor, _) = editor("<p>abc</p>", range(&[0, 0], 0, &[0, 0], 3));

    editor
        .run_command("style.font_size", Some(serde_json::json!({ "px": 18 })))
        .unwrap();
    editor
        .run_command("style.highlight", Some(serde_json::json!({ "color": "yellow" })))
        .unwrap();
    editor
        .run_command("style.font", Some(serde_json::json!({ "family": "Georgia" })))
        .unwrap();
    editor
        .run_command(
            "style.apply",
            Some(serde_json::json!({ "prop": "letter-spacing", "value": "2px" })),
        )
        .unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p><span style=\"font-size: 18px\"><span style=\"background-color: yellow\">\
         <span style=\"font-family: Georgia\"><span style=\"letter-spacing: 2px\">abc\
         </span></span></span></span></p>"
    );
}

#[test]
fn wrapping_across_nodes_keeps_order_and_text() {
    let (mut editor, _) = editor(
        "<p>one <b>two</b> three</p>",
        range(&[0, 0], 2, &[0, 2], 3),
    );

    editor.run_command("marks.underline", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p>on<u>e <b>two</b> th</u>ree</p>"
    );
    assert_eq!(editor.doc().text_content(), "one two three");
    assert_eq!(editor.selection(), Some(&range(&[0, 1], 0, &[0, 1], 3)));
}

#[test]
fn backward_selection_wraps_the_same_span() {
    let (mut editor, _) = editor("<p>abcde</p>", range(&[0, 0], 4, &[0, 0], 1));

    editor.run_command("marks.strikethrough", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>a<s>bcd</s>e</p>");
}

#[test]
fn collapsed_basic_marks_are_silent_no_ops() {
    let (mut editor, notices) = editor("<p>abc</p>", range(&[0, 0], 1, &[0, 0], 1));
    let before = editor.doc().clone();

    for id in ["marks.bold", "marks.italic", "marks.underline", "marks.strikethrough"] {
        editor.run_command(id, None).unwrap();
    }

    assert_eq!(editor.doc(), &before);
    assert!(notices.borrow().is_empty());
}

#[test]
fn collapsed_script_and_style_commands_notify() {
    let (mut editor, notices) = editor("<p>abc</p>", range(&[0, 0], 1, &[0, 0], 1));
    let before = editor.doc().clone();

    editor.run_command("marks.superscript", None).unwrap();
    editor.run_command("marks.subscript", None).unwrap();
    editor
        .run_command("style.color", Some(serde_json::json!({ "color": "red" })))
        .unwrap();

    assert_eq!(editor.doc(), &before);
    assert_eq!(
        *notices.borrow(),
        vec![
            Notice::ScriptSelectionRequired,
            Notice::ScriptSelectionRequired,
            Notice::StyleSelectionRequired,
        ]
    );
}

#[test]
fn missing_selection_notifies_for_style() {
    let (mut editor, notices) = editor("<p>abc</p>", range(&[0, 0], 0, &[0, 0], 1));
    editor.set_selection(None);

    editor
        .run_command("style.apply", Some(serde_json::json!({ "prop": "color", "value": "red" })))
        .unwrap();
    editor.run_command("marks.bold", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>abc</p>");
    assert_eq!(*notices.borrow(), vec![Notice::StyleSelectionRequired]);
}

#[test]
fn selection_outside_the_root_is_left_alone() {
    let doc = parse_fragment("<p>outside</p><div><p>inside</p></div>");
    let mut editor = Editor::new(doc, EditableRoot::new(vec![1]), CommandRegistry::standard());
    editor.select(range(&[0, 0], 0, &[0, 0], 3));

    editor.run_command("marks.bold", None).unwrap();
    assert_eq!(editor.doc().to_markup(), "<p>outside</p><div><p>inside</p></div>");

    editor.select(range(&[1, 0, 0], 0, &[1, 0, 0], 2));
    editor.run_command("marks.bold", None).unwrap();
    assert_eq!(
        editor.doc().to_markup(),
        "<p>outside</p><div><p><b>in</b>side</p></div>"
    );
}

#[test]
fn direct_calls_report_why_nothing_happened() {
    let (mut editor, _) = editor("<p>abc</p>", range(&[0, 0], 2, &[0, 0], 2));

    let result = editor.edit(|cx| apply_inline_tag(cx, InlineTag::Subscript));
    assert_eq!(result, Err(EditError::CollapsedSelection));

    editor.select(range(&[0, 0], 0, &[0, 0], 2));
    editor
        .edit(|cx| apply_inline_tag(cx, InlineTag::Subscript))
        .unwrap();
    assert_eq!(editor.doc().to_markup(), "<p><sub>ab</sub>c</p>");
}

#[test]
fn malformed_arguments_are_command_errors() {
    let (mut editor, _) = editor("<p>abc</p>", range(&[0, 0], 0, &[0, 0], 1));

    let err = editor.run_command("style.color", None).unwrap_err();
    assert_eq!(err.message(), "Missing args.color");
    assert!(editor.run_command("marks.blink", None).is_err());
    assert_eq!(editor.doc().to_markup(), "<p>abc</p>");
}
