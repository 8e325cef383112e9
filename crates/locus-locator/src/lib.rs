//! locus locator - element locating and similarity matching
//!
//! Turns a captured node into a weighted ancestor descriptor chain
//! ([`Directory`]), renders it to a path expression or selector string,
//! resolves either form back against the tree, generalizes pairs of
//! locators over structurally similar elements, and replays stored
//! locators segment-by-segment to diagnose where matching breaks.

mod builder;
mod directory;
mod parse;
mod policy;
mod render;
mod resolve;
mod similar;
mod watcher;

pub use builder::{LocatorBuilder, ShadowCapture};
pub use directory::{AttrDescriptor, AttrKind, Directory, DirectoryEntry};
pub use parse::{CompoundSelector, SelectorStep, parse_path, parse_selector};
pub use policy::{RegexStablePolicy, StablePolicy};
pub use render::{
    only_position, render_path, render_selector, render_shadow_path,
    render_shadow_selector,
};
pub use resolve::{resolve_directory, resolve_path, resolve_selector};
pub use similar::{
    BatchValues, ExtractedAttrs, ExtractedValue, ValueSource, batch_capture,
    extract_values, generalize, generalize_path, generalize_selector,
    widen_directory, widen_selector,
};
pub use watcher::{WatchResult, diagnose, diagnose_path, diagnose_selector};

/// Boundary marker between chained fragments of a locator that crosses
/// into a nested shadow sub-tree
pub const SHADOW_MARKER: &str = "$shadow$";

/// Locator error
///
/// A malformed fragment is recoverable: resolution reports it, the watcher
/// catches it locally and turns it into a failing segment. The only fatal
/// variant wraps a detached tree handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("malformed locator fragment: {0}")]
    Malformed(String),
    #[error(transparent)]
    Dom(#[from] locus_dom::DomError),
}
