//! Error types for query construction and compilation.
//!
//! Every error here is a programmer error raised at the offending builder or
//! compile call. Nothing is retried.

use thiserror::Error;

use crate::from::JoinKind;

/// Errors raised while building or compiling a statement.
#[derive(Debug, Error)]
pub enum Error {
    /// A column name is not part of the node it was resolved against.
    #[error("unknown column '{column}' on '{relation}'")]
    UnknownColumn {
        /// The requested column.
        column: String,
        /// The table, alias or subquery it was looked up on.
        relation: String,
    },

    /// A join was requested before any FROM item was set.
    #[error("a primary table must be selected before other tables can be joined")]
    NoPrimaryTable,

    /// A bare column name was given but no node is tracked to resolve it.
    #[error("cannot resolve column '{0}': no table has been selected")]
    NoSource(String),

    /// A column refers to a node that is not part of the statement.
    #[error("column '{0}' belongs to a table that is not part of this query")]
    UnknownSource(String),

    /// An inner, left or full join was built without a condition.
    #[error("{0} requires a join condition")]
    MissingJoinCondition(JoinKind),

    /// A cross join was given a condition.
    #[error("CROSS JOIN does not take a join condition")]
    UnexpectedJoinCondition,

    /// An expression without an output name was selected or returned.
    #[error("expressions must have names; use .as_(name)")]
    UnnamedExpression,

    /// A `table.*` selection was used as INSERT source columns.
    #[error("INSERT ... SELECT needs named columns; all-columns selections are not allowed")]
    AllColumnsInInsert,

    /// An INSERT source query selects nothing.
    #[error("INSERT ... SELECT needs at least one selected column")]
    EmptyInsertSelection,

    /// An inserted column does not exist on the target table.
    #[error("cannot insert into unknown column '{column}' of '{table}'")]
    UnknownInsertColumn {
        /// The offending column.
        column: String,
        /// The target table.
        table: String,
    },

    /// A row does not provide a required column.
    #[error("missing required column '{column}' for insert into '{table}'")]
    MissingRequiredColumn {
        /// The missing column.
        column: String,
        /// The target table.
        table: String,
    },

    /// A predicate or join condition is not boolean.
    #[error("{context} must be a boolean expression, found {found}")]
    NotBoolean {
        /// Where the expression was used.
        context: &'static str,
        /// Type of the rejected expression.
        found: String,
    },

    /// A subquery used as a scalar does not select exactly one column.
    #[error("a scalar subquery must select exactly one column, found {0}")]
    ScalarSubquery(usize),

    /// An explicit derived-table column list does not match the query.
    #[error("column list names {found} columns but the query produces {expected}")]
    ColumnListMismatch {
        /// Columns produced by the query.
        expected: usize,
        /// Columns in the explicit list.
        found: usize,
    },

    /// An UPDATE without assignments.
    #[error("UPDATE requires at least one SET assignment")]
    EmptyUpdate,

    /// An UPDATE or DELETE was compiled without a WHERE predicate.
    #[error("refusing to compile {0} without a WHERE clause")]
    MissingWhere(&'static str),

    /// A value does not fit its type.
    #[error("type error: {0}")]
    Type(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dialect cannot express a feature.
    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported {
        /// The feature that was requested.
        feature: &'static str,
        /// The dialect name.
        dialect: &'static str,
    },

    /// Invalid configuration data.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for builder and compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
