//! Locator Builder
//!
//! Walks from a captured node to the root, weighing per-level candidates
//! (unique id, sibling index, discriminating class, type/title, target
//! text) into a [`Directory`]. Priority is id > text > everything else;
//! traversal stops at a body/root boundary or the first unique-id
//! ancestor unless an absolute walk is forced.

use crate::directory::{AttrDescriptor, Directory, DirectoryEntry};
use crate::policy::{RegexStablePolicy, StablePolicy, is_supported_tag};
use crate::{render, resolve};
use locus_dom::{DeepHit, DomError, DomTree, NodeId};

/// Captured text longer than this is useless as a locator condition
const MAX_TEXT_LENGTH: usize = 100;
/// Cap on title attribute participation
const MAX_ATTRIBUTE_LENGTH: usize = 100;

/// A point capture that crossed shadow boundaries: one Directory per
/// fragment (outermost host first, target last) plus both rendered
/// chained locator forms
#[derive(Debug, Clone)]
pub struct ShadowCapture {
    pub fragments: Vec<Directory>,
    pub path: String,
    pub selector: String,
}

pub struct LocatorBuilder<'a> {
    tree: &'a DomTree,
    policy: Box<dyn StablePolicy>,
}

impl<'a> LocatorBuilder<'a> {
    pub fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            policy: Box::new(RegexStablePolicy::new()),
        }
    }

    /// Swap the token stability predicate
    pub fn with_policy(tree: &'a DomTree, policy: Box<dyn StablePolicy>) -> Self {
        Self { tree, policy }
    }

    /// Build the descriptor chain for `target`.
    ///
    /// `absolute` forces a full walk to the tree root, ignoring unique-id
    /// short-circuits and the body boundary.
    pub fn build(&self, target: NodeId, absolute: bool) -> Result<Directory, DomError> {
        let mut entries = Vec::new();
        let mut cur = target;
        loop {
            let entry = self.level_entry(cur, entries.is_empty())?;
            let stop_at_id = !absolute && entry.attr("id").is_some_and(|a| a.checked);
            entries.push(entry);
            if stop_at_id {
                break;
            }
            match self.tree.parent_element(cur) {
                Some(parent) => {
                    if !absolute && self.tree.tag(parent) == Some("body") {
                        break;
                    }
                    cur = parent;
                }
                None => break,
            }
        }
        entries.reverse();
        let mut dir = Directory::new(entries);
        self.rebuild(target, &mut dir);
        tracing::debug!("built locator: {}", render::render_path(&dir));
        Ok(dir)
    }

    /// Build fragment Directories for a deep point hit and render the
    /// boundary-joined locator forms.
    ///
    /// Each crossed host anchors one fragment; the final fragment locates
    /// the hit element inside the innermost sub-tree.
    pub fn build_deep(&self, hit: &DeepHit, absolute: bool) -> Result<ShadowCapture, DomError> {
        let mut fragments = Vec::with_capacity(hit.hosts.len() + 1);
        for &host in &hit.hosts {
            fragments.push(self.build(host, absolute)?);
        }
        fragments.push(self.build(hit.element, absolute)?);
        Ok(ShadowCapture {
            path: render::render_shadow_path(&fragments),
            selector: render::render_shadow_selector(&fragments),
            fragments,
        })
    }

    /// Assemble one level's descriptor with initial weights
    fn level_entry(&self, node: NodeId, is_target: bool) -> Result<DirectoryEntry, DomError> {
        let el = self.tree.element(node)?;
        let tag = if is_supported_tag(&el.tag) {
            el.tag.clone()
        } else {
            "*".to_string()
        };

        let mut attrs = Vec::new();
        if let Some(id) = &el.id {
            if self.is_unique_id(id) {
                attrs.push(AttrDescriptor::exact("id", id.clone(), true));
            }
        }
        let index = self.tree.same_tag_index(node);
        if self.tree.has_same_tag_siblings(node) && index > 0 {
            attrs.push(AttrDescriptor::exact("index", index.to_string(), true));
        }
        if let Some(ty) = self.tree.raw_attr(node, "type").filter(|v| !v.is_empty()) {
            attrs.push(AttrDescriptor::exact("type", ty, true));
        }
        if let Some(class) = self.pick_class(node) {
            attrs.push(AttrDescriptor::contains("class", class, true));
        }
        if let Some(title) = self
            .tree
            .raw_attr(node, "title")
            .filter(|v| !v.is_empty() && v.len() < MAX_ATTRIBUTE_LENGTH)
        {
            attrs.push(AttrDescriptor::exact("title", title, false));
        }
        if is_target {
            let text = self.tree.node_text(node);
            if !text.is_empty() && text.len() < MAX_TEXT_LENGTH {
                attrs.push(AttrDescriptor::contains("text", text, true));
            }
        }
        weigh(&mut attrs);

        let mut entry = DirectoryEntry::new(&tag);
        entry.attrs = attrs;
        Ok(entry)
    }

    /// Discriminating class: first stable token no sibling shares
    fn pick_class(&self, node: NodeId) -> Option<String> {
        let el = self.tree.get(node)?.as_element()?;
        el.classes
            .iter()
            .find(|c| self.policy.is_stable(c) && !self.tree.sibling_shares_class(node, c))
            .cloned()
    }

    fn is_unique_id(&self, id: &str) -> bool {
        self.policy.is_stable(id) && self.tree.count_id(id) == 1
    }

    /// Second pass: from target upward, speculatively uncheck each index
    /// descriptor; keep it unchecked only while the target stays the sole
    /// match of the re-rendered locator.
    fn rebuild(&self, origin: NodeId, dir: &mut Directory) {
        for i in (0..dir.entries.len()).rev() {
            let was_checked = dir.entries[i].attr("index").is_some_and(|a| a.checked);
            if !was_checked {
                continue;
            }
            dir.entries[i].set_checked("index", false);
            let sole_match = resolve::resolve_directory(self.tree, dir, false)
                .map(|m| m.len() == 1 && m[0] == origin)
                .unwrap_or(false);
            if !sole_match {
                dir.entries[i].set_checked("index", true);
            }
        }
    }
}

/// id outweighs everything; text outweighs the rest
fn weigh(attrs: &mut [AttrDescriptor]) {
    if attrs.iter().any(|a| a.name == "id") {
        for a in attrs.iter_mut() {
            a.checked = a.name == "id";
        }
    } else if attrs.iter().any(|a| a.name == "text") {
        for a in attrs.iter_mut() {
            a.checked = a.name == "text";
        }
    }
}
