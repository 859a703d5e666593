//! Statement builders.
//!
//! Builders are consumed and returned by every call. Calls that can fail
//! validate their input immediately and return [`crate::Result`], so a
//! finished builder always describes a statement that can be compiled.
//!
//! ```rust
//! use quarry_core::builder::Select;
//! use quarry_core::dialect::PostgresDialect;
//! use quarry_core::{Compiler, SqlType, Table};
//!
//! let users = Table::builder("users")
//!     .required("id", SqlType::Integer)
//!     .required("name", SqlType::Text)
//!     .build();
//!
//! let query = Select::from(&users)
//!     .columns(&["id", "name"])?
//!     .where_eq([("name", "Ann")])?;
//!
//! let compiled = Compiler::new(&PostgresDialect).compile(&query)?;
//! assert_eq!(compiled.sql, "SELECT id, name FROM users WHERE name = $1");
//! # Ok::<(), quarry_core::Error>(())
//! ```

pub(crate) mod clause;
pub(crate) mod delete;
pub(crate) mod expr;
pub(crate) mod insert;
pub(crate) mod select;
pub(crate) mod update;
pub mod value;

pub use clause::{Order, OrderItem, SelectItem, SelectedColumns, Selection};
pub use delete::Delete;
pub use expr::{
    count_all, exists, inline, not_exists, val, val_as, BinaryOp, ColumnRef, Expr, ExprKind,
    FunctionCall, NamedExpr, UnaryOp,
};
pub use insert::Insert;
pub use select::Select;
pub use update::Update;
pub use value::{IntoOperand, SqlValue, ToSqlValue};
