//! locus table - logical grid reconstruction and column capture
//!
//! Rebuilds the logical grid behind a `<table>` element, span attributes
//! resolved, and turns a single captured cell into a locator covering its
//! whole column.

mod column;
mod grid;

pub use column::{column_locator, column_path, column_selector, column_values};
pub use grid::{TableColumn, TableGrid, header_values, reconstruct};

/// Table error
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("element is not inside a table")]
    NotInTable,
    #[error(transparent)]
    Locator(#[from] locus_locator::LocatorError),
    #[error(transparent)]
    Dom(#[from] locus_dom::DomError),
}
