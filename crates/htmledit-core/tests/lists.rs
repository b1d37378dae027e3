use gpui_htmledit_core::markup::parse_fragment;
use gpui_htmledit_core::{
    CommandRegistry, EditError, EditableRoot, Editor, ListKind, Point, Range, toggle_list,
};

fn caret(path: &[usize], offset: usize) -> Range {
    Range::collapsed(Point::new(path.to_vec(), offset))
}

fn editor(markup: &str, selection: Range) -> Editor {
    let mut editor = Editor::with_standard_plugins(parse_fragment(markup));
    editor.select(selection);
    editor
}

#[test]
fn toggle_wraps_block_in_single_item_list() {
    let mut editor = editor("<p>a</p><p>b <i>c</i></p>", caret(&[1, 1, 0], 1));

    editor.run_command("list.toggle_unordered", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p>a</p><ul><li>b <i>c</i></li></ul>"
    );
    assert_eq!(editor.selection(), Some(&caret(&[1, 0, 1, 0], 1)));
    assert_eq!(
        editor.run_query::<Option<String>>("list.active_tag", None).unwrap(),
        Some("ul".to_string())
    );
}

#[test]
fn toggle_wraps_headings_with_ordered_list() {
    let mut editor = editor("<h2>Title</h2>", caret(&[0, 0], 0));

    editor.run_command("list.toggle_ordered", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<ol><li>Title</li></ol>");
}

#[test]
fn toggle_unwraps_every_item_into_paragraphs() {
    let mut editor = editor(
        "<p>x</p><ol><li>one</li><li>t<b>wo</b></li><li>three</li></ol><p>y</p>",
        Range::new(Point::new(vec![1, 1, 1, 0], 1), Point::new(vec![2, 0], 1)),
    );

    editor.run_command("list.toggle_unordered", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<p>x</p><p>one</p><p>t<b>wo</b></p><p>three</p><p>y</p>"
    );
    assert_eq!(
        editor.selection(),
        Some(&Range::new(
            Point::new(vec![2, 1, 0], 1),
            Point::new(vec![4, 0], 1)
        ))
    );
    assert_eq!(
        editor.run_query::<Option<String>>("list.active_tag", None).unwrap(),
        None
    );
}

#[test]
fn unwrap_drops_stray_list_children() {
    let mut editor = editor("<ul> <li>a</li> <li>b</li> </ul>", caret(&[0, 1, 0], 0));

    editor.run_command("list.toggle_ordered", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>a</p><p>b</p>");
    assert_eq!(editor.selection(), Some(&caret(&[0, 0], 0)));
}

#[test]
fn toggling_twice_keeps_the_text() {
    let mut editor = editor("<h3>same words</h3>", caret(&[0, 0], 4));
    let text = editor.doc().text_content();

    editor.run_command("list.toggle_unordered", None).unwrap();
    editor.run_command("list.toggle_unordered", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>same words</p>");
    assert_eq!(editor.doc().text_content(), text);
    assert_eq!(editor.selection(), Some(&caret(&[0, 0], 4)));
}

#[test]
fn toggle_inside_nested_list_unwraps_the_inner_list() {
    let mut editor = editor(
        "<ul><li>top<ul><li>inner</li></ul></li></ul>",
        caret(&[0, 0, 1, 0, 0], 2),
    );

    editor.run_command("list.toggle_unordered", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<ul><li>top<p>inner</p></li></ul>"
    );
    assert_eq!(editor.selection(), Some(&caret(&[0, 0, 1, 0], 2)));
}

#[test]
fn toggle_without_a_block_is_a_no_op() {
    let mut editor = editor("loose <b>text</b>", caret(&[1, 0], 1));

    let result = editor.edit(|cx| toggle_list(cx, ListKind::Unordered));

    assert_eq!(result, Err(EditError::NoBlock));
    assert_eq!(editor.doc().to_markup(), "loose <b>text</b>");
}

#[test]
fn toggle_refuses_the_root_and_outside_content() {
    let doc = parse_fragment("<p>out</p><div>in</div>");
    let mut editor = Editor::new(doc, EditableRoot::new(vec![1]), CommandRegistry::standard());

    editor.select(caret(&[1, 0], 1));
    assert_eq!(
        editor.edit(|cx| toggle_list(cx, ListKind::Ordered)),
        Err(EditError::OutsideRoot)
    );

    editor.select(caret(&[0, 0], 1));
    editor.run_command("list.toggle_ordered", None).unwrap();

    assert_eq!(editor.doc().to_markup(), "<p>out</p><div>in</div>");
}

#[test]
fn list_outside_the_root_is_not_unwrapped() {
    let doc = parse_fragment("<ul><li><div><p>item</p></div></li></ul>");
    let mut editor = Editor::new(
        doc,
        EditableRoot::new(vec![0, 0, 0]),
        CommandRegistry::standard(),
    );
    editor.select(caret(&[0, 0, 0, 0, 0], 0));

    editor.run_command("list.toggle_unordered", None).unwrap();

    assert_eq!(
        editor.doc().to_markup(),
        "<ul><li><div><ul><li>item</li></ul></div></li></ul>"
    );
}
