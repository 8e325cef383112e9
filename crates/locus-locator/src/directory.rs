//! Directory model
//!
//! A [`Directory`] is the weighted ancestor descriptor chain produced at
//! capture time: one [`DirectoryEntry`] per tree level, root to target,
//! each carrying an ordered bag of [`AttrDescriptor`]s. `checked` flags
//! control which pieces participate in rendering; generalization works by
//! unchecking.

use serde::{Deserialize, Serialize};

/// Comparison mode of an attribute descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrKind {
    /// Equality against the full attribute value
    Exact,
    /// Substring containment
    Contains,
    /// Regular-expression post-filter (never rendered into the locator)
    Regex,
}

/// One attribute condition at one ancestor level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDescriptor {
    pub name: String,
    pub value: String,
    /// Participates in rendering
    pub checked: bool,
    pub kind: AttrKind,
}

impl AttrDescriptor {
    pub fn new(name: &str, value: impl Into<String>, checked: bool, kind: AttrKind) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            checked,
            kind,
        }
    }

    pub fn exact(name: &str, value: impl Into<String>, checked: bool) -> Self {
        Self::new(name, value, checked, AttrKind::Exact)
    }

    pub fn contains(name: &str, value: impl Into<String>, checked: bool) -> Self {
        Self::new(name, value, checked, AttrKind::Contains)
    }

    pub fn is_text(&self) -> bool {
        self.name == "text" || self.name == "innertext"
    }
}

/// One level of the descriptor chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Lowercase tag name, `*` for unsupported tags
    pub tag: String,
    /// Display value (mirrors `tag`)
    pub value: String,
    /// `false` means wildcard tag match at this level
    pub checked: bool,
    /// Attribute conditions, in capture order
    pub attrs: Vec<AttrDescriptor>,
}

impl DirectoryEntry {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            value: tag.to_string(),
            checked: true,
            attrs: Vec::new(),
        }
    }

    /// Effective tag token: wildcard when unchecked
    pub fn tag_token(&self) -> &str {
        if self.checked { &self.tag } else { "*" }
    }

    pub fn is_wildcard(&self) -> bool {
        !self.checked || self.tag == "*"
    }

    pub fn attr(&self, name: &str) -> Option<&AttrDescriptor> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn attr_mut(&mut self, name: &str) -> Option<&mut AttrDescriptor> {
        self.attrs.iter_mut().find(|a| a.name == name)
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) {
        if let Some(a) = self.attr_mut(name) {
            a.checked = checked;
        }
    }

    /// Make this level a pure wildcard: any tag, no conditions
    pub fn clear_to_wildcard(&mut self) {
        self.checked = false;
        for a in self.attrs.iter_mut() {
            a.checked = false;
        }
    }
}

/// Ordered descriptor chain, root to target; length >= 1.
///
/// Only the final entry may carry a text-kind attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Directory {
    pub entries: Vec<DirectoryEntry>,
}

impl Directory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry describing the target itself
    pub fn target(&self) -> Option<&DirectoryEntry> {
        self.entries.last()
    }
}
