//! Table declarations attached to Rust types.
//!
//! `#[derive(Table)]` from `quarry-derive` implements [`TableSchema`] for a
//! struct, mapping its fields to columns.

use crate::from::Table;

/// A Rust type that declares a table.
pub trait TableSchema {
    /// Returns the table node. Every call returns the same node, so columns
    /// taken from different calls belong to the same table.
    fn table() -> Table;

    /// Returns the table under an alias, as a new node.
    fn aliased(alias: &str) -> Table {
        Self::table().aliased(alias)
    }
}
