//! DOM Tree (arena-based allocation)
//!
//! Navigation, attribute and text access, sibling indices, geometry and
//! hit-testing queries over an externally-built tree. Shadow sub-trees are
//! attached to host elements and never reached by plain child traversal;
//! crossings are always explicit.

use crate::{DomError, ElementData, Node, NodeData, NodeId, Point, Rect};

/// Result of a deep (shadow-descending) point lookup
#[derive(Debug, Clone)]
pub struct DeepHit {
    /// The deepest element found at the point
    pub element: NodeId,
    /// Shadow hosts crossed on the way, outermost first
    pub hosts: Vec<NodeId>,
}

/// Arena-based DOM tree
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get a node, treating a stale handle as a hard error
    pub fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::DetachedNode(id))
    }

    /// Get element data, treating non-element or stale handles as hard errors
    pub fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.node(id)?
            .as_element()
            .ok_or(DomError::DetachedNode(id))
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- construction (host side) ----

    /// Create a detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev = self.nodes[parent.0 as usize].last_child;
        {
            let c = &mut self.nodes[child.0 as usize];
            c.parent = parent;
            c.prev_sibling = prev;
        }
        if prev.is_none() {
            self.nodes[parent.0 as usize].first_child = child;
        } else {
            self.nodes[prev.0 as usize].next_sibling = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
    }

    /// Attach a shadow sub-tree to `host`, returning the new fragment root.
    ///
    /// The fragment root is not a child of `host`: normal traversal never
    /// reaches it.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        let root = self.push(Node::document());
        if let Some(el) = self.nodes[host.0 as usize].as_element_mut() {
            el.shadow_root = root;
        }
        root
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.nodes[id.0 as usize].as_element_mut() {
            el.set_attr(name, value);
        }
    }

    /// Supply layout geometry for an element
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(el) = self.nodes[id.0 as usize].as_element_mut() {
            el.rect = Some(rect);
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ---- navigation ----

    /// Parent node, if any
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let p = self.get(id)?.parent;
        (!p.is_none()).then_some(p)
    }

    /// Parent element (skips the document root)
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let p = self.parent(id)?;
        self.get(p)?.is_element().then_some(p)
    }

    /// Element children, in document order
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.get(id) else { return out };
        let mut cur = node.first_child;
        while !cur.is_none() {
            if self.nodes[cur.0 as usize].is_element() {
                out.push(cur);
            }
            cur = self.nodes[cur.0 as usize].next_sibling;
        }
        out
    }

    /// All element descendants in pre-order, not crossing shadow boundaries
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_elements(root);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.child_elements(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Sibling elements (including `id` itself)
    pub fn sibling_elements(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(p) => self.child_elements(p),
            None => vec![id],
        }
    }

    /// Root of the fragment containing `id` (document or shadow root)
    pub fn fragment_root(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    /// Tag name, if `id` is an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Shadow root attached to `id`, if any
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        let root = self.get(id)?.as_element()?.shadow_root;
        (!root.is_none()).then_some(root)
    }

    /// Nearest ancestor-or-self with the given tag
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.tag(n) == Some(tag) {
                return Some(n);
            }
            cur = self.parent_element(n);
        }
        None
    }

    // ---- sibling indices ----

    /// 1-based index among same-tag element siblings (0 when detached)
    pub fn same_tag_index(&self, id: NodeId) -> usize {
        let Some(tag) = self.tag(id) else { return 0 };
        let tag = tag.to_string();
        self.sibling_elements(id)
            .iter()
            .filter(|&&s| self.tag(s) == Some(tag.as_str()))
            .position(|&s| s == id)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// 1-based index among all element siblings (0 when detached)
    pub fn child_index(&self, id: NodeId) -> usize {
        self.sibling_elements(id)
            .iter()
            .position(|&s| s == id)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Whether `id` has at least one other same-tag element sibling
    pub fn has_same_tag_siblings(&self, id: NodeId) -> bool {
        let Some(tag) = self.tag(id) else { return false };
        let tag = tag.to_string();
        self.sibling_elements(id)
            .iter()
            .filter(|&&s| self.tag(s) == Some(tag.as_str()))
            .count()
            > 1
    }

    /// Whether any sibling of `id` (excluding itself) carries `class`
    pub fn sibling_shares_class(&self, id: NodeId, class: &str) -> bool {
        self.sibling_elements(id).iter().any(|&s| {
            s != id
                && self
                    .get(s)
                    .and_then(|n| n.as_element())
                    .is_some_and(|e| e.has_class(class))
        })
    }

    /// Count elements carrying the exact id attribute, across all fragments
    pub fn count_id(&self, id_value: &str) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.id.as_deref() == Some(id_value))
            .count()
    }

    // ---- attributes and text ----

    /// Raw attribute value
    pub fn raw_attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.get(id)?
            .as_element()?
            .get_attr(name)
            .map(str::to_string)
    }

    /// Attribute access with the synthetic `text` entry.
    ///
    /// `text` resolves to the first non-empty direct text child, control
    /// characters stripped. Everything else is the raw attribute.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        if name == "text" {
            let t = self.node_text(id);
            return (!t.is_empty()).then_some(t);
        }
        self.raw_attr(id, name)
    }

    /// First non-empty direct text child, control characters stripped
    pub fn node_text(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        let mut cur = node.first_child;
        while !cur.is_none() {
            if let Some(t) = self.nodes[cur.0 as usize].as_text() {
                let cleaned = strip_control(t);
                let cleaned = cleaned.trim();
                if !cleaned.is_empty() {
                    return cleaned.to_string();
                }
            }
            cur = self.nodes[cur.0 as usize].next_sibling;
        }
        String::new()
    }

    /// Concatenated descendant text, not crossing shadow boundaries
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        strip_control(out.trim())
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        let mut cur = node.first_child;
        while !cur.is_none() {
            match &self.nodes[cur.0 as usize].data {
                NodeData::Text(t) => out.push_str(&t.content),
                NodeData::Element(_) => self.collect_text(cur, out),
                _ => {}
            }
            cur = self.nodes[cur.0 as usize].next_sibling;
        }
    }

    /// Element-specific display text.
    ///
    /// Form controls report their current value or placeholder, images their
    /// alt text, everything else its visible text content.
    pub fn display_text(&self, id: NodeId) -> String {
        let Some(tag) = self.tag(id) else {
            return String::new();
        };
        let first = |names: &[&str]| -> String {
            names
                .iter()
                .find_map(|n| self.raw_attr(id, n).filter(|v| !v.is_empty()))
                .unwrap_or_default()
        };
        match tag {
            "input" | "textarea" | "select" => first(&["value", "placeholder"]),
            "img" => first(&["alt"]),
            _ => self.text_content(id),
        }
    }

    // ---- visibility ----

    /// Hidden elements and elements with explicit zero-area geometry are
    /// invisible. Elements without layout info count as visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        match self.get(id).and_then(|n| n.as_element()) {
            Some(el) => !el.hidden && !el.rect.map(|r| r.is_empty()).unwrap_or(false),
            None => false,
        }
    }

    /// Keep only visible elements, preserving order
    pub fn filter_visible(&self, ids: Vec<NodeId>) -> Vec<NodeId> {
        ids.into_iter().filter(|&id| self.is_visible(id)).collect()
    }

    /// Layout rect, if the host supplied one
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.get(id)?.as_element()?.rect
    }

    // ---- hit-testing ----

    /// All visible elements under `root` whose rect contains the point,
    /// deepest first
    pub fn elements_from_point(&self, root: NodeId, p: Point) -> Vec<NodeId> {
        let mut hits: Vec<(usize, NodeId)> = self
            .descendant_elements(root)
            .into_iter()
            .filter(|&id| self.is_visible(id))
            .filter(|&id| self.rect(id).is_some_and(|r| r.contains_point(p)))
            .map(|id| (self.depth(id), id))
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Topmost (deepest) element at the point
    pub fn element_from_point(&self, root: NodeId, p: Point) -> Option<NodeId> {
        self.elements_from_point(root, p).into_iter().next()
    }

    /// Of all hits containing the point, the one whose box is closest to it
    pub fn closest_element_by_point(&self, root: NodeId, p: Point) -> Option<NodeId> {
        let hits = self.elements_from_point(root, p);
        hits.into_iter().min_by(|&a, &b| {
            let da = self.rect(a).map(|r| r.corner_distance(p)).unwrap_or(f64::MAX);
            let db = self.rect(b).map(|r| r.corner_distance(p)).unwrap_or(f64::MAX);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Point lookup that descends into shadow sub-trees exposed by the
    /// topmost hit, recording each host crossed.
    pub fn find_element_by_point(&self, p: Point) -> Option<DeepHit> {
        let mut hosts = Vec::new();
        let mut root = NodeId::ROOT;
        loop {
            let hit = self.element_from_point(root, p)?;
            match self.shadow_root(hit) {
                Some(shadow) if self.element_from_point(shadow, p).is_some() => {
                    hosts.push(hit);
                    root = shadow;
                }
                _ => return Some(DeepHit { element: hit, hosts }),
            }
        }
    }

    fn depth(&self, id: NodeId) -> usize {
        let mut d = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            d += 1;
            cur = p;
        }
        d
    }
}

/// Strip ASCII control characters (the original source of locator noise in
/// captured text)
pub fn strip_control(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}
