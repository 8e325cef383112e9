//! HTML loader
//!
//! Uses html5ever's built-in RcDom and converts into the arena tree. The
//! capture engine never parses markup itself; this exists for hosts and
//! tests that need to materialize a page snapshot.

use crate::{DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string into an arena tree
    pub fn parse(&self, html: &str) -> DomTree {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .expect("reading from an in-memory buffer cannot fail");

        let mut tree = DomTree::new();
        convert_node(&dom.document, &mut tree, NodeId::ROOT);
        tracing::debug!("loaded {} nodes", tree.len());
        tree
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent);
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                let id = tree.create_text(&text);
                tree.append_child(parent, id);
            }
        }
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                tree.set_attr(id, &attr.name.local, &attr.value);
            }
            if is_hidden(tree, id) {
                if let Some(el) = tree.get_mut(id).and_then(|n| n.as_element_mut()) {
                    el.hidden = true;
                }
            }
            tree.append_child(parent, id);
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id);
            }
        }
        // doctype, comments, processing instructions: nothing to locate
        _ => {}
    }
}

fn is_hidden(tree: &DomTree, id: NodeId) -> bool {
    if tree.raw_attr(id, "hidden").is_some() {
        return true;
    }
    match tree.raw_attr(id, "style") {
        Some(style) => {
            let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            style.contains("display:none")
                || style.contains("visibility:hidden")
                || style.contains("visibility:collapse")
        }
        None => false,
    }
}
