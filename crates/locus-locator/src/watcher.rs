//! Locator Watcher
//!
//! Replays a stored locator one structural segment at a time against the
//! current tree and reports exactly where matching stops. Strictly
//! monotonic left-to-right: once a prefix fails, recovery is the caller's
//! business.

use crate::parse::{split_path_segments, split_selector_steps};
use crate::{SHADOW_MARKER, resolve};
use locus_dom::{DomTree, NodeId};
use serde::{Deserialize, Serialize};

/// Outcome of a stepwise locator replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchResult {
    pub found: bool,
    /// First match of the longest prefix that still resolved
    pub last_matched_node: Option<NodeId>,
    /// That prefix, re-renderable and re-checkable by the caller
    pub last_matched_prefix: Option<String>,
    /// Segment at which matching stopped (`None` when found)
    pub failing_segment: Option<String>,
    /// 1-based index of the segment that started the failing step; a
    /// failed shadow crossing reports the boundary marker itself. 0 when
    /// found.
    pub failing_index: usize,
}

impl WatchResult {
    fn found(node: Option<NodeId>, prefix: Option<String>) -> Self {
        Self {
            found: true,
            last_matched_node: node,
            last_matched_prefix: prefix,
            failing_segment: None,
            failing_index: 0,
        }
    }
}

/// Diagnose either locator form; leading `/` means path expression
pub fn diagnose(tree: &DomTree, locator: &str, position_only: bool) -> WatchResult {
    if locator.trim_start().starts_with('/') {
        diagnose_path(tree, locator, position_only)
    } else {
        diagnose_selector(tree, locator, position_only)
    }
}

/// Stepwise path replay
pub fn diagnose_path(tree: &DomTree, path: &str, position_only: bool) -> WatchResult {
    let segments = split_path_segments(path);
    let mut state = WalkState::default();

    let mut i = 0;
    while i < segments.len() {
        let segment = &segments[i];
        let (step, consumed) = if segment == SHADOW_MARKER {
            // the marker and the segment after it only resolve together
            match segments.get(i + 1) {
                Some(next) => (format!("/{SHADOW_MARKER}//{next}"), 2),
                None => return state.fail(path.to_string(), i + 1),
            }
        } else if i == 0 && !segment.starts_with("html") {
            (format!("//{segment}"), 1)
        } else {
            (format!("/{segment}"), 1)
        };
        let prefix = format!("{}{step}", state.prefix);
        match resolve::resolve_path(tree, &prefix, position_only) {
            Ok(nodes) if !nodes.is_empty() => state.advance(prefix, nodes[0]),
            _ => return state.fail(prefix, i + 1),
        }
        i += consumed;
    }
    WatchResult::found(state.node, state.matched_prefix())
}

/// Stepwise selector replay
pub fn diagnose_selector(tree: &DomTree, selector: &str, position_only: bool) -> WatchResult {
    let steps = split_selector_steps(selector);
    let mut state = WalkState::default();

    let mut i = 0;
    while i < steps.len() {
        let consumed = if steps[i] == SHADOW_MARKER {
            if i + 1 >= steps.len() {
                return state.fail(selector.to_string(), i + 1);
            }
            2
        } else {
            1
        };
        let prefix = steps[..i + consumed].join(">");
        match resolve::resolve_selector(tree, &prefix, position_only) {
            Ok(nodes) if !nodes.is_empty() => state.advance(prefix, nodes[0]),
            _ => return state.fail(prefix, i + 1),
        }
        i += consumed;
    }
    WatchResult::found(state.node, state.matched_prefix())
}

#[derive(Default)]
struct WalkState {
    prefix: String,
    node: Option<NodeId>,
}

impl WalkState {
    fn advance(&mut self, prefix: String, node: NodeId) {
        self.prefix = prefix;
        self.node = Some(node);
    }

    fn matched_prefix(&self) -> Option<String> {
        (!self.prefix.is_empty()).then(|| self.prefix.clone())
    }

    fn fail(self, failing: String, index: usize) -> WatchResult {
        WatchResult {
            found: false,
            last_matched_node: self.node,
            last_matched_prefix: self.matched_prefix(),
            failing_segment: Some(failing),
            failing_index: index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_dom::HtmlParser;

    fn tree() -> DomTree {
        HtmlParser::new().parse(
            r#"<div id="root"><ul class="list"><li>a</li><li>b</li></ul></div>"#,
        )
    }

    #[test]
    fn test_diagnose_path_found() {
        let t = tree();
        let r = diagnose_path(&t, "//div[@id=\"root\"]/ul/li[position()=2]", false);
        assert!(r.found);
        assert!(r.failing_segment.is_none());
        assert_eq!(
            r.last_matched_prefix.as_deref(),
            Some("//div[@id=\"root\"]/ul/li[position()=2]")
        );
        assert!(r.last_matched_node.is_some());
    }

    #[test]
    fn test_diagnose_path_reports_failing_segment() {
        let t = tree();
        let r = diagnose_path(&t, "//div[@id=\"root\"]/ol/li", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 2);
        assert_eq!(r.failing_segment.as_deref(), Some("//div[@id=\"root\"]/ol"));
        assert_eq!(r.last_matched_prefix.as_deref(), Some("//div[@id=\"root\"]"));
    }

    #[test]
    fn test_diagnose_path_first_segment_fails() {
        let t = tree();
        let r = diagnose_path(&t, "//nav/ul", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 1);
        assert!(r.last_matched_prefix.is_none());
        assert!(r.last_matched_node.is_none());
    }

    #[test]
    fn test_diagnose_path_malformed_segment_is_caught() {
        let t = tree();
        let r = diagnose_path(&t, "//div[@id=\"root\"]/ul[oops]/li", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 2);
        assert_eq!(r.last_matched_prefix.as_deref(), Some("//div[@id=\"root\"]"));
    }

    #[test]
    fn test_diagnose_selector_stepwise() {
        let t = tree();
        let r = diagnose_selector(&t, "#root>ul.list>li:nth-child(2)", false);
        assert!(r.found);
        let r = diagnose_selector(&t, "#root>ol.list>li", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 2);
        assert_eq!(r.failing_segment.as_deref(), Some("#root>ol.list"));
        assert_eq!(r.last_matched_prefix.as_deref(), Some("#root"));
    }

    #[test]
    fn test_diagnose_shadow_step_is_atomic() {
        let mut t = tree();
        let ul = t
            .descendant_elements(NodeId::ROOT)
            .into_iter()
            .find(|&n| t.tag(n) == Some("ul"))
            .unwrap();
        let shadow = t.attach_shadow(ul);
        let btn = t.create_element("button");
        t.append_child(shadow, btn);

        let r = diagnose_selector(&t, "ul.list>$shadow$>button", false);
        assert!(r.found);
        assert_eq!(r.last_matched_node, Some(btn));

        // marker pointing at a missing inner element fails as one step,
        // reported at the marker's own index
        let r = diagnose_selector(&t, "ul.list>$shadow$>input", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 2);
        assert_eq!(r.last_matched_prefix.as_deref(), Some("ul.list"));

        let r = diagnose_path(&t, "//ul/$shadow$//input", false);
        assert!(!r.found);
        assert_eq!(r.failing_index, 2);
        assert_eq!(r.last_matched_prefix.as_deref(), Some("//ul"));

        let r = diagnose_path(&t, "//ul/$shadow$//button", false);
        assert!(r.found);
        assert_eq!(r.last_matched_node, Some(btn));
    }

    #[test]
    fn test_diagnose_dispatch() {
        let t = tree();
        assert!(diagnose(&t, "//div[@id=\"root\"]", false).found);
        assert!(diagnose(&t, "#root", false).found);
    }
}
