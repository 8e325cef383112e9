//! Similarity Generalizer
//!
//! Derives one relaxed locator from two captures of structurally analogous
//! elements (or widens a single capture), then resolves it to the whole
//! family and extracts one value per member under a shared policy.

use crate::directory::{AttrKind, Directory};
use crate::{LocatorError, render, resolve};
use locus_dom::{DomTree, NodeId};
use serde::{Deserialize, Serialize};

/// Which attribute a batch's values were read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Text,
    Src,
    Href,
}

/// Alternate attributes captured alongside a node's text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One extraction record per matched node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    pub text: String,
    pub attrs: ExtractedAttrs,
}

/// Batch extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchValues {
    pub source: ValueSource,
    pub values: Vec<ExtractedValue>,
}

/// Generalize two Directories captured from structurally analogous
/// elements into one matching the whole family.
///
/// Precondition: equal entry count and matching tag at every level
/// (wildcards match anything). Returns `None` when the chains are not
/// similar. Attributes whose value differs or is absent in `b` are
/// cleared; text attributes are always cleared, sibling text differs by
/// definition.
pub fn generalize(a: &Directory, b: &Directory) -> Option<Directory> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    for (ea, eb) in a.entries.iter().zip(&b.entries) {
        if !ea.is_wildcard() && !eb.is_wildcard() && ea.tag != eb.tag {
            return None;
        }
    }

    let mut out = a.clone();
    for (entry, eb) in out.entries.iter_mut().zip(&b.entries) {
        for attr in entry.attrs.iter_mut() {
            if attr.is_text() {
                attr.checked = false;
                attr.value.clear();
                continue;
            }
            match eb.attr(&attr.name) {
                None => {
                    attr.checked = false;
                    attr.value.clear();
                }
                Some(other) => {
                    let same = attr.kind == other.kind
                        && attr.value == other.value
                        && !attr.value.is_empty();
                    if same {
                        attr.checked = attr.checked && other.checked;
                    } else {
                        attr.checked = false;
                    }
                }
            }
        }
    }
    Some(out)
}

/// Segment-wise path generalization: differing segments lose their
/// predicate brackets.
pub fn generalize_path(a: &str, b: &str) -> String {
    if a == b {
        return a.to_string();
    }
    let sa: Vec<&str> = a.split('/').collect();
    let sb: Vec<&str> = b.split('/').collect();
    sa.iter()
        .enumerate()
        .map(|(i, seg)| {
            if sb.get(i).map(|s| *s) == Some(*seg) {
                seg.to_string()
            } else {
                seg.split('[').next().unwrap_or("").to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Segment-wise selector generalization.
///
/// Differing segments are relaxed in order: nth predicate first, then
/// class tokens, then id tokens.
pub fn generalize_selector(a: &str, b: &str) -> String {
    if a == b {
        return a.to_string();
    }
    let sb: Vec<&str> = b.split('>').collect();
    a.split('>')
        .enumerate()
        .map(|(i, seg)| {
            let mut seg = seg.to_string();
            let differs = |s: &str| sb.get(i).map(|o| *o) != Some(s);
            if differs(&seg) && seg.contains(":nth-") {
                seg = seg[..seg.find(":nth-").expect("just checked")].to_string();
            }
            if differs(&seg) && seg.contains('.') {
                seg = seg[..seg.find('.').expect("just checked")].to_string();
            }
            if differs(&seg) && seg.contains('#') {
                seg = seg[..seg.find('#').expect("just checked")].to_string();
            }
            seg
        })
        .collect::<Vec<_>>()
        .join(">")
}

/// Widen a single capture into a family locator.
///
/// Non-leading ids and all text conditions are dropped, then each index
/// descriptor (target upward) is speculatively unchecked and the
/// configuration with the most matches wins.
pub fn widen_directory(tree: &DomTree, dir: &Directory) -> Directory {
    let mut work = dir.clone();
    for (i, entry) in work.entries.iter_mut().enumerate() {
        for attr in entry.attrs.iter_mut() {
            if attr.name == "id" && i != 0 {
                attr.checked = false;
            }
            if attr.is_text() {
                attr.checked = false;
            }
        }
    }

    let mut best = work.clone();
    let mut best_count = 0usize;
    for i in (0..work.entries.len()).rev() {
        let checked = work.entries[i].attr("index").is_some_and(|a| a.checked);
        if !checked {
            continue;
        }
        work.entries[i].set_checked("index", false);
        let count = resolve::resolve_directory(tree, &work, false)
            .map(|m| m.len())
            .unwrap_or(0);
        if count > best_count {
            best_count = count;
            best = work.clone();
        }
        work.entries[i].set_checked("index", true);
    }
    best
}

/// Widen a selector string: for each nth-bearing segment (right to left),
/// try the bare tag and keep the variant matching the most elements.
pub fn widen_selector(tree: &DomTree, selector: &str) -> String {
    let segments: Vec<&str> = selector.split('>').collect();
    let mut best = selector.to_string();
    let mut best_count = 0usize;
    for i in (0..segments.len()).rev() {
        if !segments[i].contains(":nth-") {
            continue;
        }
        let tag = segments[i].split(':').next().unwrap_or("");
        let mut candidate = segments.clone();
        candidate[i] = tag;
        let candidate = candidate.join(">");
        let count = resolve::resolve_selector(tree, &candidate, false)
            .map(|m| m.len())
            .unwrap_or(0);
        if count >= best_count {
            best_count = count;
            best = candidate;
        }
    }
    best
}

/// Extract one value per node under the shared batch policy.
///
/// Element-specific text first; if every member's text is empty and all
/// share a `src` (or `href`), the batch switches to that attribute.
pub fn extract_values(tree: &DomTree, nodes: &[NodeId]) -> BatchValues {
    let mut values: Vec<ExtractedValue> = nodes
        .iter()
        .map(|&n| {
            let text = locus_dom::strip_control(&tree.display_text(n));
            let src = tree.raw_attr(n, "src").filter(|v| !v.is_empty());
            let href = tree.raw_attr(n, "href").filter(|v| !v.is_empty());
            ExtractedValue {
                attrs: ExtractedAttrs {
                    src,
                    href,
                    text: (!text.is_empty()).then(|| text.clone()),
                },
                text,
            }
        })
        .collect();

    let mut source = ValueSource::Text;
    if !values.is_empty() && values.iter().all(|v| v.text.is_empty()) {
        if values.iter().all(|v| v.attrs.src.is_some()) {
            for v in values.iter_mut() {
                v.text = v.attrs.src.clone().expect("checked above");
            }
            source = ValueSource::Src;
        } else if values.iter().all(|v| v.attrs.href.is_some()) {
            for v in values.iter_mut() {
                v.text = v.attrs.href.clone().expect("checked above");
            }
            source = ValueSource::Href;
        }
    }
    BatchValues { source, values }
}

/// Full single-capture batch: widen, resolve, extract
pub fn batch_capture(tree: &DomTree, dir: &Directory) -> Result<BatchValues, LocatorError> {
    let widened = widen_directory(tree, dir);
    let path = render::render_path(&widened);
    tracing::debug!("batch locator: {path}");
    let nodes = resolve::resolve_directory(tree, &widened, false)?;
    Ok(extract_values(tree, &nodes))
}
