use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

pub type Path = Vec<usize>;
pub type Attrs = BTreeMap<String, String>;
pub type Style = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    P,
    Div,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Li,
    Ul,
    Ol,
    Span,
    B,
    I,
    U,
    S,
    Sup,
    Sub,
    A,
    Other(String),
}

impl Tag {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" => Tag::P,
            "div" => Tag::Div,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "li" => Tag::Li,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "span" => Tag::Span,
            "b" => Tag::B,
            "i" => Tag::I,
            "u" => Tag::U,
            "s" => Tag::S,
            "sup" => Tag::Sup,
            "sub" => Tag::Sub,
            "a" => Tag::A,
            other => Tag::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::P => "p",
            Tag::Div => "div",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::Li => "li",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Span => "span",
            Tag::B => "b",
            Tag::I => "i",
            Tag::U => "u",
            Tag::S => "s",
            Tag::Sup => "sup",
            Tag::Sub => "sub",
            Tag::A => "a",
            Tag::Other(name) => name,
        }
    }

    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Tag::H1),
            2 => Some(Tag::H2),
            3 => Some(Tag::H3),
            4 => Some(Tag::H4),
            5 => Some(Tag::H5),
            6 => Some(Tag::H6),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Other(name) if matches!(name.as_str(), "br" | "hr" | "img"))
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::parse(&value)
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn element(tag: Tag, children: Vec<Node>) -> Self {
        Node::Element(ElementNode::new(tag).with_children(children))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(Tag::P, vec![Node::text(text)])
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.as_element().map(|el| &el.tag)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => {
                for child in &el.children {
                    child.push_text(out);
                }
            }
        }
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Node::Text(t) => escape_text(&t.text, out),
            Node::Element(el) => {
                out.push('<');
                out.push_str(el.tag.as_str());
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                if !el.style.is_empty() {
                    out.push_str(" style=\"");
                    escape_attr(&el.style_attr(), out);
                    out.push('"');
                }
                out.push('>');
                if el.tag.is_void() {
                    return;
                }
                for child in &el.children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(el.tag.as_str());
                out.push('>');
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: Tag,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: Attrs::new(),
            style: Style::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, prop: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(prop.into(), value.into());
        self
    }

    pub fn style_value(&self, prop: &str) -> Option<&str> {
        self.style.get(prop).map(String::as_str)
    }

    pub fn inner_content(&self) -> Vec<Node> {
        self.children.clone()
    }

    pub fn shell(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            style: self.style.clone(),
            children: Vec::new(),
        }
    }

    pub fn element_child_count(&self) -> usize {
        self.children.iter().filter(|n| !n.is_text()).count()
    }

    pub fn style_attr(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_markup(&mut out);
        }
        out
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Result<&mut Node, PathError> {
        if path.is_empty() {
            return Err(PathError("Empty path".into()));
        }
        node_in_mut(&mut self.children, path, 0)
    }

    pub fn element(&self, path: &[usize]) -> Option<&ElementNode> {
        self.node(path).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Result<&mut ElementNode, PathError> {
        self.node_mut(path)?
            .as_element_mut()
            .ok_or_else(|| PathError("Expected element node".into()))
    }

    pub fn children_at(&self, path: &[usize]) -> Option<&[Node]> {
        if path.is_empty() {
            return Some(&self.children);
        }
        self.element(path).map(|el| el.children.as_slice())
    }

    pub fn children_mut(&mut self, path: &[usize]) -> Result<&mut Vec<Node>, PathError> {
        if path.is_empty() {
            return Ok(&mut self.children);
        }
        match self.node_mut(path)? {
            Node::Element(el) => Ok(&mut el.children),
            Node::Text(_) => Err(PathError("Text node is not a container".into())),
        }
    }

    pub fn is_text(&self, path: &[usize]) -> bool {
        self.node(path).is_some_and(Node::is_text)
    }

    pub fn insert_node(&mut self, path: &[usize], node: Node) -> Result<(), PathError> {
        let (&index, parent_path) = path
            .split_last()
            .ok_or_else(|| PathError("Empty insert path".into()))?;
        let children = self.children_mut(parent_path)?;
        if index > children.len() {
            return Err(PathError(format!(
                "Insert index out of bounds: {index} > {}",
                children.len()
            )));
        }
        children.insert(index, node);
        Ok(())
    }

    pub fn remove_node(&mut self, path: &[usize]) -> Result<Node, PathError> {
        let (&index, parent_path) = path
            .split_last()
            .ok_or_else(|| PathError("Empty remove path".into()))?;
        let children = self.children_mut(parent_path)?;
        if index >= children.len() {
            return Err(PathError(format!(
                "Remove index out of bounds: {index} >= {}",
                children.len()
            )));
        }
        Ok(children.remove(index))
    }

    pub fn replace_node(&mut self, path: &[usize], node: Node) -> Result<Node, PathError> {
        let slot = self.node_mut(path)?;
        Ok(std::mem::replace(slot, node))
    }
}

fn node_in_mut<'a>(
    children: &'a mut [Node],
    path: &[usize],
    depth: usize,
) -> Result<&'a mut Node, PathError> {
    let Some((&ix, rest)) = path.split_first() else {
        return Err(PathError("Empty path".into()));
    };
    let len = children.len();
    let node = children.get_mut(ix).ok_or_else(|| {
        PathError(format!("Path out of bounds at depth {depth}: {ix} >= {len}"))
    })?;
    if rest.is_empty() {
        return Ok(node);
    }
    match node {
        Node::Element(el) => node_in_mut(&mut el.children, rest, depth + 1),
        Node::Text(_) => Err(PathError(format!("Non-container node at depth {depth}"))),
    }
}

pub fn element_path(doc: &Document, path: &[usize]) -> Path {
    if doc.is_text(path) {
        path[..path.len() - 1].to_vec()
    } else {
        path.to_vec()
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph("one"),
            Node::element(
                Tag::Ul,
                vec![Node::element(Tag::Li, vec![Node::text("two")])],
            ),
        ])
    }

    #[test]
    fn node_lookup_follows_paths() {
        let doc = sample();
        assert_eq!(doc.node(&[1, 0, 0]), Some(&Node::text("two")));
        assert_eq!(doc.node(&[1, 0]).and_then(Node::tag), Some(&Tag::Li));
        assert!(doc.node(&[]).is_none());
        assert!(doc.node(&[0, 0, 0]).is_none());
        assert!(doc.node(&[5]).is_none());
    }

    #[test]
    fn node_mut_reports_bad_paths() {
        let mut doc = sample();
        assert!(doc.node_mut(&[]).is_err());
        assert!(doc.node_mut(&[0, 3]).is_err());
        assert!(doc.node_mut(&[0, 0, 0]).is_err());
        assert!(doc.node_mut(&[1, 0, 0]).is_ok());
    }

    #[test]
    fn insert_remove_and_replace() {
        let mut doc = sample();
        doc.insert_node(&[1], Node::paragraph("mid")).unwrap();
        assert_eq!(doc.to_markup(), "<p>one</p><p>mid</p><ul><li>two</li></ul>");

        let removed = doc.remove_node(&[0]).unwrap();
        assert_eq!(removed.text_content(), "one");

        let old = doc
            .replace_node(&[1], Node::element(Tag::H2, vec![Node::text("t")]))
            .unwrap();
        assert_eq!(old.tag(), Some(&Tag::Ul));
        assert_eq!(doc.to_markup(), "<p>mid</p><h2>t</h2>");

        assert!(doc.insert_node(&[9], Node::text("x")).is_err());
        assert!(doc.remove_node(&[]).is_err());
    }

    #[test]
    fn markup_escapes_text_and_attributes() {
        let el = ElementNode::new(Tag::A)
            .with_attr("href", "a?b=1&c=\"2\"")
            .with_style("color", "red")
            .with_children(vec![Node::text("<x> & y")]);
        assert_eq!(
            Node::Element(el).to_markup(),
            "<a href=\"a?b=1&amp;c=&quot;2&quot;\" style=\"color: red\">&lt;x&gt; &amp; y</a>"
        );
    }

    #[test]
    fn tags_round_trip_through_names() {
        for name in ["p", "div", "h3", "li", "ul", "ol", "sup", "a", "blockquote"] {
            assert_eq!(Tag::parse(name).as_str(), name);
        }
        assert_eq!(Tag::parse("H1"), Tag::H1);
        assert_eq!(Tag::heading(6), Some(Tag::H6));
        assert_eq!(Tag::heading(7), None);
    }

    #[test]
    fn serde_uses_tag_names() {
        let node = Node::paragraph("x");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["node"], "element");
        assert_eq!(json["tag"], "p");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
