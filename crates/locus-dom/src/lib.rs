//! locus DOM - Document tree adapter
//!
//! Arena-based view of a live markup tree: navigation, attribute and text
//! access, geometry, hit-testing, and nested shadow sub-trees. The capture
//! engine only reads this tree; hosts (and tests) build it, typically via
//! [`HtmlParser`].

mod geometry;
mod node;
mod parser;
mod tree;

pub use geometry::{Point, Rect};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use parser::HtmlParser;
pub use tree::{DeepHit, DomTree, strip_control};

/// Node identifier (index into arena)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);
    /// Document root ID
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Tree adapter error
///
/// A detached or out-of-range handle is the only fatal condition: every
/// other miss (no such attribute, no match) is an empty result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("detached or out-of-range node handle: {0:?}")]
    DetachedNode(NodeId),
}
