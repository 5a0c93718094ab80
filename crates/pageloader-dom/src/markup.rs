//! Markup parsing and serialization
//!
//! Fragments are parsed with html5ever into its RcDom and converted into
//! arena nodes, which is simpler than implementing a TreeSink directly.
//! Serialization produces the equivalent of `innerHTML`.

use crate::{DomTree, NodeData, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse `markup` and append the resulting nodes to `parent`.
///
/// The fragment is parsed as a document body; content html5ever hoists into
/// `<head>` (leading `<style>`, `<link>`, ...) is kept, ahead of the body
/// content, so nothing the page shipped is lost.
pub fn parse_fragment(tree: &mut DomTree, parent: NodeId, markup: &str) -> Vec<NodeId> {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);

    let mut created = Vec::new();
    for child in dom.document.children.borrow().iter() {
        if let RcNodeData::Element { name, .. } = &child.data {
            if &*name.local == "html" {
                for section in child.children.borrow().iter() {
                    for node in section.children.borrow().iter() {
                        if let Some(id) = convert_node(node, tree, parent) {
                            created.push(id);
                        }
                    }
                }
            }
        }
    }

    tracing::trace!("Parsed fragment into {} top-level nodes", created.len());
    created
}

/// Convert an RcDom node (and its subtree) into arena nodes under `parent`
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Option<NodeId> {
    match &handle.data {
        RcNodeData::Text { contents } => {
            let id = tree.create_text(&contents.borrow());
            tree.append_child(parent, id);
            Some(id)
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(contents);
            tree.append_child(parent, id);
            Some(id)
        }
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            if let Ok(elem) = tree.element_mut(id) {
                for attr in attrs.borrow().iter() {
                    elem.set_attr(&attr.name.local, &attr.value);
                }
                // Default checkedness follows the attribute
                elem.checked = elem.has_attr("checked");
            }
            tree.append_child(parent, id);

            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id);
            }
            Some(id)
        }
        RcNodeData::Document
        | RcNodeData::Doctype { .. }
        | RcNodeData::ProcessingInstruction { .. } => None,
    }
}

/// Serialize the children of `node` (the `innerHTML` of an element)
pub fn serialize_children(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    let raw = tree
        .get(node)
        .and_then(|n| n.as_element())
        .is_some_and(|e| RAW_TEXT_ELEMENTS.contains(&e.tag.as_str()));
    for child in tree.child_ids(node) {
        serialize_node(tree, child, raw, &mut out);
    }
    out
}

fn serialize_node(tree: &DomTree, id: NodeId, raw_text: bool, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            out.push_str(&serialize_children(tree, id));
            out.push_str("</");
            out.push_str(&elem.tag);
            out.push('>');
        }
        NodeData::Document => {
            for child in tree.child_ids(id) {
                serialize_node(tree, child, false, out);
            }
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(markup: &str) -> String {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        parse_fragment(&mut tree, host, markup);
        serialize_children(&tree, host)
    }

    #[test]
    fn test_parse_simple_fragment() {
        assert_eq!(roundtrip("<h1>Home</h1>"), "<h1>Home</h1>");
    }

    #[test]
    fn test_attributes_preserved_in_order() {
        let out = roundtrip(r#"<input id="sw" class="a b" type="checkbox">"#);
        assert_eq!(out, r#"<input id="sw" class="a b" type="checkbox">"#);
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(roundtrip("<p>a &amp; b &lt; c</p>"), "<p>a &amp; b &lt; c</p>");
    }

    #[test]
    fn test_placeholders_survive_parsing() {
        assert_eq!(
            roundtrip(r#"<div title="{{tip}}">{{a.b}}</div>"#),
            r#"<div title="{{tip}}">{{a.b}}</div>"#
        );
    }

    #[test]
    fn test_leading_style_kept() {
        let out = roundtrip("<style>p > a { color: red; }</style><p>x</p>");
        assert_eq!(out, "<style>p > a { color: red; }</style><p>x</p>");
    }

    #[test]
    fn test_checked_attribute_sets_property() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        let nodes = parse_fragment(&mut tree, host, r#"<input type="checkbox" checked>"#);
        assert!(tree.element(nodes[0]).unwrap().checked);
    }
}
