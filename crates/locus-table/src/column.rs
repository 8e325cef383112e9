//! Whole-column capture
//!
//! Turns one captured cell into a locator matching every cell of its
//! column. The cell's own level keeps only its position among same-tag
//! siblings, the enclosing row level drops every condition, and the rest
//! of the chain stays as built, so `tr[1]/td[2]` style captures become
//! `tr/td[position()=2]`.

use crate::TableError;
use locus_dom::{DomTree, NodeId};
use locus_locator::{
    AttrDescriptor, BatchValues, Directory, LocatorBuilder, extract_values,
    render_path, render_selector, resolve_directory,
};

/// Build the column Directory for the cell at or above `node`
pub fn column_locator(tree: &DomTree, node: NodeId) -> Result<Directory, TableError> {
    let cell = enclosing_cell(tree, node).ok_or(TableError::NotInTable)?;
    tree.closest(cell, "table").ok_or(TableError::NotInTable)?;

    let mut dir = LocatorBuilder::new(tree).build(cell, false)?;
    let last = dir.entries.len() - 1;
    for (i, entry) in dir.entries.iter_mut().enumerate() {
        if i == last {
            // the column is the cell's position; nothing else may narrow it
            entry.attrs = vec![AttrDescriptor::exact(
                "index",
                tree.same_tag_index(cell).to_string(),
                true,
            )];
        } else if entry.tag == "tr" {
            for attr in entry.attrs.iter_mut() {
                attr.checked = false;
            }
        }
    }
    tracing::debug!("column locator: {}", render_path(&dir));
    Ok(dir)
}

/// Path form of the column locator
pub fn column_path(tree: &DomTree, node: NodeId) -> Result<String, TableError> {
    Ok(render_path(&column_locator(tree, node)?))
}

/// Selector form of the column locator
pub fn column_selector(tree: &DomTree, node: NodeId) -> Result<String, TableError> {
    Ok(render_selector(&column_locator(tree, node)?))
}

/// Resolve the column and extract its values, top to bottom.
///
/// The locator is already as wide as the column; no further widening, or
/// the cell position would fall away and the whole table would match.
pub fn column_values(tree: &DomTree, node: NodeId) -> Result<BatchValues, TableError> {
    let dir = column_locator(tree, node)?;
    let nodes = resolve_directory(tree, &dir, false)?;
    Ok(extract_values(tree, &nodes))
}

/// Nearest `td` or `th` ancestor-or-self
fn enclosing_cell(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if matches!(tree.tag(n), Some("td") | Some("th")) {
            return Some(n);
        }
        cur = tree.parent_element(n);
    }
    None
}
