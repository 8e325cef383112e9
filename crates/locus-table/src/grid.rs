//! Table Reconstructor
//!
//! Projects a `<table>` subtree onto its logical grid. Cells spanning
//! several rows or columns are stamped into every slot they claim, so
//! downstream column capture sees a rectangular matrix regardless of the
//! markup's span tricks.

use crate::TableError;
use locus_dom::{DomTree, NodeId};
use serde::{Deserialize, Serialize};

/// Rectangular view of a table: one header row plus the body matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

/// One column of a reconstructed grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub title: String,
    pub values: Vec<String>,
}

impl TableGrid {
    /// Number of columns in the widest row
    pub fn width(&self) -> usize {
        self.header
            .len()
            .max(self.body.iter().map(Vec::len).max().unwrap_or(0))
    }

    /// Columnar view, titles from the header row
    pub fn columns(&self) -> Vec<TableColumn> {
        (0..self.width())
            .map(|c| TableColumn {
                title: self
                    .header
                    .get(c)
                    .cloned()
                    .unwrap_or_else(|| format!("Column {}", c + 1)),
                values: self
                    .body
                    .iter()
                    .map(|row| row.get(c).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect()
    }
}

/// Rebuild the logical grid of the table enclosing `node`.
///
/// The header comes from the widest `<thead>` row; without a `<thead>`,
/// a leading all-`<th>` body row is promoted. Missing titles are padded
/// as `Column N`.
pub fn reconstruct(tree: &DomTree, node: NodeId) -> Result<TableGrid, TableError> {
    let table = tree.closest(node, "table").ok_or(TableError::NotInTable)?;

    let mut body_rows = section_rows(tree, table, "tbody");
    if body_rows.is_empty() {
        body_rows = tree
            .child_elements(table)
            .into_iter()
            .filter(|&c| tree.tag(c) == Some("tr"))
            .collect();
    }

    let mut header = header_row(tree, table);
    if header.is_empty()
        && body_rows
            .first()
            .is_some_and(|&r| all_th(tree, r) && body_rows.len() > 1)
    {
        let promoted = body_rows.remove(0);
        header = expand_cells(tree, promoted);
    }

    let mut body = stamp(tree, &body_rows);
    let width = header
        .len()
        .max(body.iter().map(Vec::len).max().unwrap_or(0));
    for row in &mut body {
        row.resize(width, String::new());
    }
    while header.len() < width {
        header.push(format!("Column {}", header.len() + 1));
    }
    tracing::debug!(
        rows = body.len(),
        cols = width,
        "reconstructed table grid"
    );
    Ok(TableGrid { header, body })
}

/// Header texts for the table enclosing `node`, without the grid.
///
/// The widest `<thead>` row wins; a table without one reads the row
/// nearest the capture instead (its own `<tr>`, else the first body
/// row), so `<td>`-based pseudo headers still come back as texts.
pub fn header_values(tree: &DomTree, node: NodeId) -> Result<Vec<String>, TableError> {
    let table = tree.closest(node, "table").ok_or(TableError::NotInTable)?;
    let header = header_row(tree, table);
    if !header.is_empty() {
        return Ok(header);
    }
    let nearest = tree.closest(node, "tr").or_else(|| {
        let rows = section_rows(tree, table, "tbody");
        if rows.is_empty() {
            tree.child_elements(table)
                .into_iter()
                .find(|&c| tree.tag(c) == Some("tr"))
        } else {
            rows.into_iter().next()
        }
    });
    Ok(nearest.map(|r| expand_cells(tree, r)).unwrap_or_default())
}

/// `<tr>` children of every `section`-tagged child of `table`
fn section_rows(tree: &DomTree, table: NodeId, section: &str) -> Vec<NodeId> {
    tree.child_elements(table)
        .into_iter()
        .filter(|&c| tree.tag(c) == Some(section))
        .flat_map(|s| tree.child_elements(s))
        .filter(|&c| tree.tag(c) == Some("tr"))
        .collect()
}

fn header_row(tree: &DomTree, table: NodeId) -> Vec<String> {
    section_rows(tree, table, "thead")
        .into_iter()
        .map(|r| expand_cells(tree, r))
        .max_by_key(Vec::len)
        .unwrap_or_default()
}

/// Cell texts of one row, each repeated to cover its colspan
fn expand_cells(tree: &DomTree, row: NodeId) -> Vec<String> {
    let mut out = Vec::new();
    for cell in row_cells(tree, row) {
        let text = tree.text_content(cell);
        for _ in 0..span(tree, cell, "colspan") {
            out.push(text.clone());
        }
    }
    out
}

fn row_cells(tree: &DomTree, row: NodeId) -> Vec<NodeId> {
    tree.child_elements(row)
        .into_iter()
        .filter(|&c| matches!(tree.tag(c), Some("td") | Some("th")))
        .collect()
}

fn all_th(tree: &DomTree, row: NodeId) -> bool {
    let cells = row_cells(tree, row);
    !cells.is_empty() && cells.iter().all(|&c| tree.tag(c) == Some("th"))
}

fn span(tree: &DomTree, cell: NodeId, name: &str) -> usize {
    tree.raw_attr(cell, name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Stamp every cell into all slots its spans claim, skipping slots
/// already claimed by a cell from an earlier row.
fn stamp(tree: &DomTree, rows: &[NodeId]) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<Option<String>>> = vec![Vec::new(); rows.len()];
    for (r, &row) in rows.iter().enumerate() {
        let mut c = 0usize;
        for cell in row_cells(tree, row) {
            while grid[r].get(c).is_some_and(Option::is_some) {
                c += 1;
            }
            let text = tree.text_content(cell);
            let down = span(tree, cell, "rowspan").min(rows.len() - r);
            let across = span(tree, cell, "colspan");
            for rr in r..r + down {
                if grid[rr].len() < c + across {
                    grid[rr].resize(c + across, None);
                }
                for slot in &mut grid[rr][c..c + across] {
                    *slot = Some(text.clone());
                }
            }
            c += across;
        }
    }
    grid.into_iter()
        .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}
