//! Projection of flat records into a fixed-order table
//!
//! The table is the interchange form handed to reports and to the publisher. Its
//! columns always appear in the order given by [`Column`]; a column is materialized
//! only when at least one record carries it, so a document without attributes
//! produces a table with neither rows nor columns.

mod column;

pub use column::Column;

use crate::hierarchy::FlatRecord;
use strum::IntoEnumIterator;

/// Flat records with their column projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<FlatRecord>,
}

impl Table {
    /// Build a table from records, keeping record order.
    #[must_use]
    pub fn assemble(rows: Vec<FlatRecord>) -> Self {
        // Every record carries every field (possibly null), so any row makes all columns present.
        let columns = if rows.is_empty() { Vec::new() } else { Column::iter().collect() };

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[FlatRecord] {
        &self.rows
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name())
    }

    /// The cells of one row, in column order.
    pub fn cells<'a>(&'a self, row: &'a FlatRecord) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.columns.iter().map(move |&c| row.get(c))
    }

    /// Keep only the first `n` rows, for previews.
    #[must_use]
    pub fn head(&self, n: usize) -> &[FlatRecord] {
        &self.rows[..n.min(self.rows.len())]
    }
}
