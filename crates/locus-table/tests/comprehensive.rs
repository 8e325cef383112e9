//! Comprehensive tests for locus-table
//!
//! Grid reconstruction and column capture over parsed documents.

use locus_dom::{DomTree, HtmlParser, NodeId};
use locus_table::{TableGrid, column_path, column_selector, column_values, reconstruct};

fn find(tree: &DomTree, tag: &str, text: &str) -> NodeId {
    tree.descendant_elements(NodeId::ROOT)
        .into_iter()
        .find(|&n| tree.tag(n) == Some(tag) && tree.text_content(n) == text)
        .unwrap()
}

fn report() -> DomTree {
    HtmlParser::new().parse(
        r#"<div id="root"><table>
            <thead><tr><th>Name</th><th>Score</th><th>Team</th></tr></thead>
            <tbody>
                <tr><td>ada</td><td>10</td><td rowspan="2">blue</td></tr>
                <tr><td>grace</td><td>12</td></tr>
                <tr><td>edsger</td><td>9</td><td>red</td></tr>
            </tbody>
        </table></div>"#,
    )
}

#[test]
fn test_grid_with_header_and_rowspan() {
    let t = report();
    let grid = reconstruct(&t, find(&t, "td", "10")).unwrap();
    assert_eq!(grid.header, vec!["Name", "Score", "Team"]);
    assert_eq!(
        grid.body,
        vec![
            vec!["ada", "10", "blue"],
            vec!["grace", "12", "blue"],
            vec!["edsger", "9", "red"],
        ]
    );
}

#[test]
fn test_grid_json_shape() {
    let t = report();
    let grid = reconstruct(&t, find(&t, "td", "10")).unwrap();
    let json = serde_json::to_string(&grid).unwrap();
    let back: TableGrid = serde_json::from_str(&json).unwrap();
    assert_eq!(back, grid);
}

#[test]
fn test_column_path_matches_every_row() {
    let t = report();
    let cell = find(&t, "td", "10");
    let path = column_path(&t, cell).unwrap();
    assert_eq!(path, "//div[@id=\"root\"]/table/tbody/tr/td[position()=2]");

    let batch = column_values(&t, cell).unwrap();
    let values: Vec<&str> = batch.values.iter().map(|v| v.text.as_str()).collect();
    assert_eq!(values, vec!["10", "12", "9"]);
}

#[test]
fn test_column_selector_form() {
    let t = report();
    let cell = find(&t, "td", "grace");
    let selector = column_selector(&t, cell).unwrap();
    assert_eq!(selector, "#root>table>tbody>tr>td:nth-of-type(1)");
}

#[test]
fn test_columns_pair_titles_with_values() {
    let t = report();
    let cols = reconstruct(&t, find(&t, "td", "10")).unwrap().columns();
    assert_eq!(cols[1].title, "Score");
    assert_eq!(cols[1].values, vec!["10", "12", "9"]);
    assert_eq!(cols[2].values, vec!["blue", "blue", "red"]);
}
