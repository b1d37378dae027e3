//! Lenient markup reader for building documents from HTML snippets.
//!
//! Hosts use it to seed an editor from stored markup and tests use it for
//! fixtures. It understands elements, quoted and bare attributes, inline
//! `style` declarations and the common character entities. Comments and
//! doctypes are skipped; unmatched end tags are ignored.

use crate::dom::{Document, ElementNode, Node, Style, Tag};

pub fn parse_fragment(input: &str) -> Document {
    let bytes = input.as_bytes();
    let mut idx = 0_usize;
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<ElementNode> = Vec::new();

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            push_node(&mut root, &mut open, Node::text(decode_entities(&input[idx..next])));
            idx = next;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            idx = find_subslice(bytes, idx.saturating_add(4), b"-->")
                .map(|end| end.saturating_add(3))
                .unwrap_or(bytes.len());
            continue;
        }

        if starts_with(bytes, idx, b"<!") || starts_with(bytes, idx, b"<?") {
            idx = skip_to_gt(bytes, idx.saturating_add(2));
            continue;
        }

        let Some((tag, next_idx)) = parse_tag(input, idx) else {
            // A stray '<' is kept as text.
            push_node(&mut root, &mut open, Node::text("<"));
            idx = idx.saturating_add(1);
            continue;
        };
        idx = next_idx;

        if tag.is_end {
            let name = Tag::parse(&tag.name);
            if let Some(depth) = open.iter().rposition(|el| el.tag == name) {
                while open.len() > depth {
                    close_top(&mut root, &mut open);
                }
            }
            continue;
        }

        let mut el = ElementNode::new(Tag::parse(&tag.name));
        for (key, value) in tag.attrs {
            if key == "style" {
                el.style = parse_style(&value);
            } else {
                el.attrs.insert(key, value);
            }
        }
        if tag.self_closing || el.tag.is_void() {
            push_node(&mut root, &mut open, Node::Element(el));
        } else {
            open.push(el);
        }
    }

    while !open.is_empty() {
        close_top(&mut root, &mut open);
    }

    Document::new(merge_text(root))
}

pub fn parse_style(input: &str) -> Style {
    let mut style = Style::new();
    for decl in input.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim();
        if prop.is_empty() || value.is_empty() {
            continue;
        }
        style.insert(prop, value.to_string());
    }
    style
}

fn push_node(root: &mut Vec<Node>, open: &mut [ElementNode], node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close_top(root: &mut Vec<Node>, open: &mut Vec<ElementNode>) {
    if let Some(mut el) = open.pop() {
        el.children = merge_text(std::mem::take(&mut el.children));
        push_node(root, open, Node::Element(el));
    }
}

fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match (out.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(next)) => prev.text.push_str(&next.text),
            (_, node) => out.push(node),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attrs: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(input: &str, start: usize) -> Option<(ParsedTag, usize)> {
    let bytes = input.as_bytes();
    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start {
        return None;
    }
    let name = input[name_start..idx].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attrs,
                        is_end,
                        self_closing: false,
                    },
                    idx.saturating_add(1),
                ));
            }
            Some(b'/') if bytes.get(idx.saturating_add(1)).copied() == Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attrs,
                        is_end,
                        self_closing: true,
                    },
                    idx.saturating_add(2),
                ));
            }
            Some(_) => {}
        }

        let key_start = idx;
        while idx < bytes.len() && !is_attr_name_end(bytes[idx]) {
            idx = idx.saturating_add(1);
        }
        if idx == key_start {
            // Lone '/' or '=' without a name.
            idx = idx.saturating_add(1);
            continue;
        }
        let key = input[key_start..idx].to_ascii_lowercase();

        idx = skip_spaces(bytes, idx);
        if bytes.get(idx).copied() != Some(b'=') {
            attrs.push((key, String::new()));
            continue;
        }
        idx = skip_spaces(bytes, idx.saturating_add(1));

        let value = match bytes.get(idx).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = idx.saturating_add(1);
                let value_end = find_byte(bytes, value_start, quote)?;
                idx = value_end.saturating_add(1);
                &input[value_start..value_end]
            }
            _ => {
                let value_start = idx;
                while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>'
                {
                    idx = idx.saturating_add(1);
                }
                &input[value_start..idx]
            }
        };
        attrs.push((key, decode_entities(value)));
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|&semi| semi <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        match decode_entity(&rest[1..semi]) {
            Some(ch) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn skip_to_gt(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() {
        if bytes[idx] == b'>' {
            return idx.saturating_add(1);
        }
        idx = idx.saturating_add(1);
    }
    bytes.len()
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let doc = parse_fragment("<p>one <b>two</b> three</p><ul><li>x</li></ul>");
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.to_markup(), "<p>one <b>two</b> three</p><ul><li>x</li></ul>");
        assert_eq!(doc.text_content(), "one two threex");
    }

    #[test]
    fn reads_attributes_and_style() {
        let doc = parse_fragment(
            "<P Style='margin-left: 40px; text-align:center' data-id=7 hidden>x</P>",
        );
        let el = doc.element(&[0]).unwrap();
        assert_eq!(el.tag, Tag::P);
        assert_eq!(el.style_value("margin-left"), Some("40px"));
        assert_eq!(el.style_value("text-align"), Some("center"));
        assert_eq!(el.attrs.get("data-id").map(String::as_str), Some("7"));
        assert_eq!(el.attrs.get("hidden").map(String::as_str), Some(""));
        assert!(!el.attrs.contains_key("style"));
    }

    #[test]
    fn decodes_entities_and_skips_comments() {
        let doc = parse_fragment("<!-- note --><p>a &amp; b &lt;c&gt; &#65;&#x42; &bogus;</p>");
        assert_eq!(doc.text_content(), "a & b <c> AB &bogus;");
    }

    #[test]
    fn tolerates_unclosed_and_stray_tags() {
        let doc = parse_fragment("<div><p>a</span>b<br>c");
        assert_eq!(doc.to_markup(), "<div><p>ab<br>c</p></div>");

        let doc = parse_fragment("1 < 2");
        assert_eq!(doc.text_content(), "1 < 2");
        assert_eq!(doc.children.len(), 1);
    }

    #[test]
    fn markup_round_trips() {
        let src =
            "<h2 style=\"text-align: center\">Title</h2><p>a<a href=\"x\" rel=\"y\">b</a></p>";
        assert_eq!(parse_fragment(src).to_markup(), src);
    }
}
