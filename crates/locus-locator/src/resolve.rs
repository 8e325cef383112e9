//! Locator resolution
//!
//! Evaluates a Directory, path expression, or selector string against the
//! tree. Zero matches is an empty vec, never an error; the only errors are
//! malformed fragments and detached handles. Matches are visibility
//! filtered, and regex-kind descriptors post-filter directory resolution.

use crate::directory::{AttrKind, Directory, DirectoryEntry};
use crate::parse::{self, CompoundSelector, SelectorStep};
use crate::render;
use crate::{LocatorError, SHADOW_MARKER};
use locus_dom::{DomTree, NodeId};

/// Resolve a Directory against the tree.
///
/// Renders nothing: the entries are evaluated directly, then regex-kind
/// descriptors (at most one per level) filter the result.
pub fn resolve_directory(
    tree: &DomTree,
    dir: &Directory,
    position_only: bool,
) -> Result<Vec<NodeId>, LocatorError> {
    if dir.is_empty() {
        return Ok(Vec::new());
    }
    let dir = if position_only {
        render::only_position(dir)
    } else {
        dir.clone()
    };
    let matches = eval_directory(tree, &dir, NodeId::ROOT);
    let matches = tree.filter_visible(matches);
    Ok(regex_filter(tree, matches, &dir))
}

/// Resolve a path expression, recursing across `$shadow$` fragments
pub fn resolve_path(
    tree: &DomTree,
    path: &str,
    position_only: bool,
) -> Result<Vec<NodeId>, LocatorError> {
    if path.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut roots = vec![NodeId::ROOT];
    let fragments: Vec<&str> = path.split(&format!("/{SHADOW_MARKER}")).collect();
    for (i, fragment) in fragments.iter().enumerate() {
        let dir = parse::parse_path(fragment)?;
        let dir = if position_only {
            render::only_position(&dir)
        } else {
            dir
        };
        let mut matches = Vec::new();
        for root in &roots {
            matches.extend(eval_directory(tree, &dir, *root));
        }
        if i + 1 == fragments.len() {
            return Ok(tree.filter_visible(matches));
        }
        roots = matches
            .into_iter()
            .filter_map(|n| tree.shadow_root(n))
            .collect();
        if roots.is_empty() {
            return Ok(Vec::new());
        }
    }
    Ok(Vec::new())
}

/// Resolve a selector string, recursing across `$shadow$` fragments
pub fn resolve_selector(
    tree: &DomTree,
    selector: &str,
    position_only: bool,
) -> Result<Vec<NodeId>, LocatorError> {
    if selector.trim().is_empty() {
        return Ok(Vec::new());
    }
    let steps = parse::parse_selector(selector)?;
    let mut fragments: Vec<Vec<CompoundSelector>> = vec![Vec::new()];
    for step in steps {
        match step {
            SelectorStep::Boundary => fragments.push(Vec::new()),
            SelectorStep::Compound(c) => {
                let c = if position_only { position_only_compound(c) } else { c };
                fragments
                    .last_mut()
                    .expect("fragments is never empty")
                    .push(c);
            }
        }
    }
    if fragments.iter().any(|f| f.is_empty()) {
        return Err(LocatorError::Malformed(selector.to_string()));
    }

    let mut roots = vec![NodeId::ROOT];
    let last = fragments.len() - 1;
    for (i, fragment) in fragments.iter().enumerate() {
        let mut matches = Vec::new();
        for root in &roots {
            matches.extend(eval_compounds(tree, fragment, *root));
        }
        if i == last {
            return Ok(tree.filter_visible(matches));
        }
        roots = matches
            .into_iter()
            .filter_map(|n| tree.shadow_root(n))
            .collect();
        if roots.is_empty() {
            return Ok(Vec::new());
        }
    }
    Ok(Vec::new())
}

/// Walk one fragment's entries from a fragment root.
///
/// An anchored chain (leading `html`) starts at the root's children;
/// anything else searches the whole fragment for the first entry. Later
/// entries match children only.
fn eval_directory(tree: &DomTree, dir: &Directory, root: NodeId) -> Vec<NodeId> {
    let anchored = dir
        .entries
        .first()
        .is_some_and(|e| e.checked && e.tag == "html");
    let mut current: Vec<NodeId> = Vec::new();
    for (i, entry) in dir.entries.iter().enumerate() {
        let candidates: Vec<NodeId> = if i == 0 {
            if anchored {
                tree.child_elements(root)
            } else {
                tree.descendant_elements(root)
            }
        } else {
            current
                .iter()
                .flat_map(|&n| tree.child_elements(n))
                .collect()
        };
        current = candidates
            .into_iter()
            .filter(|&n| matches_entry(tree, n, entry))
            .collect();
        if current.is_empty() {
            return current;
        }
    }
    current
}

fn matches_entry(tree: &DomTree, node: NodeId, entry: &DirectoryEntry) -> bool {
    let wildcard = entry.is_wildcard();
    if !wildcard && tree.tag(node) != Some(entry.tag.as_str()) {
        return false;
    }
    for attr in &entry.attrs {
        if !attr.checked || attr.value.is_empty() || attr.kind == AttrKind::Regex {
            continue;
        }
        let ok = match attr.name.as_str() {
            "index" => {
                let pos = if wildcard {
                    tree.child_index(node)
                } else {
                    tree.same_tag_index(node)
                };
                attr.value.parse::<usize>().is_ok_and(|n| n == pos)
            }
            "text" | "innertext" => match attr.kind {
                AttrKind::Contains => tree.text_content(node).contains(&attr.value),
                _ => tree.node_text(node) == attr.value,
            },
            name => {
                let actual = tree.attr(node, name).unwrap_or_default();
                match attr.kind {
                    AttrKind::Contains => actual.contains(&attr.value),
                    _ => actual == attr.value,
                }
            }
        };
        if !ok {
            return false;
        }
    }
    true
}

fn eval_compounds(tree: &DomTree, steps: &[CompoundSelector], root: NodeId) -> Vec<NodeId> {
    let mut current: Vec<NodeId> = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let candidates: Vec<NodeId> = if i == 0 {
            tree.descendant_elements(root)
        } else {
            current
                .iter()
                .flat_map(|&n| tree.child_elements(n))
                .collect()
        };
        current = candidates
            .into_iter()
            .filter(|&n| matches_compound(tree, n, step))
            .collect();
        if current.is_empty() {
            return current;
        }
    }
    current
}

fn matches_compound(tree: &DomTree, node: NodeId, c: &CompoundSelector) -> bool {
    if !c.matches_any_tag() && tree.tag(node) != Some(c.tag.as_str()) {
        return false;
    }
    if let Some(id) = &c.id {
        if tree.raw_attr(node, "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    for class in &c.classes {
        let has = tree
            .get(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.has_class(class));
        if !has {
            return false;
        }
    }
    if let Some(n) = c.nth_child {
        if tree.child_index(node) != n {
            return false;
        }
    }
    if let Some(n) = c.nth_of_type {
        if tree.same_tag_index(node) != n {
            return false;
        }
    }
    true
}

fn position_only_compound(mut c: CompoundSelector) -> CompoundSelector {
    c.classes.clear();
    c
}

/// Post-filter matches through regex-kind descriptors.
///
/// For each match, the ancestor chain is aligned level-for-level with the
/// directory; every checked regex descriptor must match the corresponding
/// ancestor's attribute value. Invalid patterns reject the node.
fn regex_filter(tree: &DomTree, matches: Vec<NodeId>, dir: &Directory) -> Vec<NodeId> {
    let has_regex = dir.entries.iter().any(|e| {
        e.attrs
            .iter()
            .any(|a| a.kind == AttrKind::Regex && a.checked && !a.value.trim().is_empty())
    });
    if !has_regex {
        return matches;
    }
    matches
        .into_iter()
        .filter(|&node| {
            let mut chain = Vec::with_capacity(dir.len());
            let mut cur = Some(node);
            for _ in 0..dir.len() {
                chain.push(cur);
                cur = cur.and_then(|n| tree.parent_element(n));
            }
            chain.reverse();
            dir.entries.iter().zip(chain).all(|(entry, level)| {
                let Some(attr) = entry
                    .attrs
                    .iter()
                    .find(|a| a.kind == AttrKind::Regex && a.checked && !a.value.trim().is_empty())
                else {
                    return true;
                };
                let Some(level) = level else { return false };
                let actual = tree.attr(level, &attr.name).unwrap_or_default();
                match regex::Regex::new(attr.value.trim()) {
                    Ok(re) => re.is_match(&actual),
                    Err(err) => {
                        tracing::warn!("invalid regex in locator: {err}");
                        false
                    }
                }
            })
        })
        .collect()
}
