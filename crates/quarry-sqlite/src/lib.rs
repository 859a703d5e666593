//! # quarry-sqlite
//!
//! SQLite dialect for `quarry-core`.
//!
//! # How SQLite differs from other dialects
//!
//! - **[RETURNING]**: SQLite supports `RETURNING` clauses on
//!   INSERT, UPDATE, and DELETE (since SQLite 3.35.0).
//! - **Identifier quoting**: SQLite uses double quotes (`"`) as
//!   the standard quoting style, though it also accepts backticks
//!   and square brackets. See [SQLite keywords].
//! - **[Type affinity]**: casts target the storage classes
//!   `INTEGER`, `REAL`, `TEXT` and `BLOB`; booleans are integers and
//!   JSON and timestamps are text.
//! - **Placeholders**: parameters are positional `?`.
//!
//! [RETURNING]: https://www.sqlite.org/lang_returning.html
//! [SQLite keywords]: https://www.sqlite.org/lang_keywords.html
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::builder::Delete;
//! use quarry_core::{Compiler, SqlType, Table};
//! use quarry_sqlite::SqliteDialect;
//!
//! let sessions = Table::builder("sessions")
//!     .required("id", SqlType::Integer)
//!     .required("user_id", SqlType::Integer)
//!     .build();
//!
//! let delete = Delete::from(&sessions)
//!     .where_eq([("user_id", 7)])?
//!     .returning_columns(&["id"])?;
//!
//! let compiled = Compiler::new(&SqliteDialect).compile(&delete)?;
//! assert_eq!(compiled.sql, "DELETE FROM sessions WHERE user_id = ? RETURNING id");
//! # Ok::<(), quarry_core::Error>(())
//! ```

mod dialect;

pub use dialect::{SqliteDialect, SQLITE_RESERVED};
