//! # quarry-core
//!
//! A composable SQL query builder and compiler.
//!
//! Queries are built from typed expressions and a graph of tables, aliases,
//! derived tables and joins. A finished statement is compiled for a dialect
//! into SQL text plus an ordered list of bound parameters.
//!
//! ```rust
//! use quarry_core::builder::{count_all, Order, Select};
//! use quarry_core::dialect::PostgresDialect;
//! use quarry_core::{Compiler, SqlType, Table};
//!
//! let contacts = Table::builder("contacts")
//!     .required("id", SqlType::Integer)
//!     .required("firstname", SqlType::Text)
//!     .build();
//! let twin = contacts.aliased("c");
//!
//! let query = Select::from(&contacts)
//!     .inner_join(&twin, contacts.col("firstname")?.eq(twin.col("firstname")?))?
//!     .select(contacts.col("firstname")?.as_("firstname"))?
//!     .select(count_all().as_("total"))?
//!     .group_by(contacts.col("firstname")?)
//!     .order_by(contacts.col("firstname")?, Order::Asc);
//!
//! let compiled = Compiler::new(&PostgresDialect).compile(&query)?;
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT contacts.firstname, count(*) AS total \
//!      FROM contacts JOIN contacts AS c ON contacts.firstname = c.firstname \
//!      GROUP BY contacts.firstname ORDER BY contacts.firstname"
//! );
//! # Ok::<(), quarry_core::Error>(())
//! ```
//!
//! ## Parameters
//!
//! Values are bound as parameters unless wrapped with
//! [`builder::inline`]. Placeholders appear in the SQL in the same order as
//! [`CompiledQuery::parameters`].

pub mod builder;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod from;
pub mod schema;
pub mod types;

pub use builder::{inline, val, val_as, Delete, Expr, Insert, Select, SqlValue, Update};
pub use compiler::{CompileOptions, CompiledQuery, Compiler, QuotingPolicy, Statement};
pub use error::{Error, Result};
pub use from::{ColumnSpec, Cte, DerivedTable, FromItem, JoinKind, Table};
pub use schema::TableSchema;
pub use types::SqlType;
