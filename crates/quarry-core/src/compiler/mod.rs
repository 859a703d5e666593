//! Compilation of finished statements into SQL text plus parameters.
//!
//! ```rust
//! use quarry_core::builder::Select;
//! use quarry_core::dialect::GenericDialect;
//! use quarry_core::{CompileOptions, Compiler, QuotingPolicy, SqlType, Table};
//!
//! let contacts = Table::builder("contacts")
//!     .required("firstname", SqlType::Text)
//!     .build();
//! let query = Select::from(&contacts).where_eq([("firstname", "Ann")])?;
//!
//! let dialect = GenericDialect::new();
//! let options = CompileOptions {
//!     quoting: QuotingPolicy::Always,
//!     ..CompileOptions::default()
//! };
//! let compiled = Compiler::new(&dialect).with_options(options).compile(&query)?;
//! assert_eq!(compiled.sql, r#"SELECT FROM "contacts" WHERE "firstname" = ?"#);
//! # Ok::<(), quarry_core::Error>(())
//! ```

mod render;
mod writer;

use serde::Deserialize;
use tracing::{debug, Dispatch};

use crate::builder::value::SqlValue;
use crate::builder::{Delete, Insert, Select, Update};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use writer::SqlWriter;

/// When identifiers are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotingPolicy {
    /// Quote identifiers that are reserved or not plain words.
    #[default]
    WhenNeeded,
    /// Quote every identifier.
    Always,
}

/// Compiler settings. Every field has a default, so a partial JSON object is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Render columns without a qualifier when their name is unique among
    /// the statement's FROM nodes.
    pub shorten_unambiguous_names: bool,
    /// Identifier quoting policy.
    pub quoting: QuotingPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            shorten_unambiguous_names: true,
            quoting: QuotingPolicy::WhenNeeded,
        }
    }
}

impl CompileOptions {
    /// Parses options from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

/// SQL text and the values bound to its placeholders, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The SQL text.
    pub sql: String,
    /// Wire values for the placeholders.
    pub parameters: Vec<SqlValue>,
}

/// A statement ready to compile.
#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    /// A SELECT.
    Select(&'a Select),
    /// An INSERT.
    Insert(&'a Insert),
    /// An UPDATE.
    Update(&'a Update),
    /// A DELETE.
    Delete(&'a Delete),
}

impl Statement<'_> {
    /// Returns the statement keyword.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }
}

impl<'a> From<&'a Select> for Statement<'a> {
    fn from(select: &'a Select) -> Self {
        Self::Select(select)
    }
}

impl<'a> From<&'a Insert> for Statement<'a> {
    fn from(insert: &'a Insert) -> Self {
        Self::Insert(insert)
    }
}

impl<'a> From<&'a Update> for Statement<'a> {
    fn from(update: &'a Update) -> Self {
        Self::Update(update)
    }
}

impl<'a> From<&'a Delete> for Statement<'a> {
    fn from(delete: &'a Delete) -> Self {
        Self::Delete(delete)
    }
}

/// Compiles statements for one dialect.
///
/// Compiling does not modify the statement; compiling it again yields the
/// same SQL and parameters.
pub struct Compiler<'d> {
    dialect: &'d dyn Dialect,
    options: CompileOptions,
    dispatch: Option<Dispatch>,
}

impl<'d> Compiler<'d> {
    /// Creates a compiler with default options.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            options: CompileOptions::default(),
            dispatch: None,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends this compiler's log events to `dispatch` instead of the
    /// ambient default subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a statement.
    ///
    /// # Errors
    ///
    /// Fails on columns whose table is not part of the statement, on values
    /// that do not serialize through their type, on UPDATE/DELETE without a
    /// WHERE clause and on features the dialect lacks.
    pub fn compile<'s>(&self, statement: impl Into<Statement<'s>>) -> Result<CompiledQuery> {
        let statement = statement.into();
        match &self.dispatch {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || self.compile_statement(statement))
            }
            None => self.compile_statement(statement),
        }
    }

    fn compile_statement(&self, statement: Statement<'_>) -> Result<CompiledQuery> {
        let mut writer = SqlWriter::new(self.dialect, &self.options);
        let rendered = match statement {
            Statement::Select(select) => writer.write_select(select),
            Statement::Insert(insert) => writer.write_insert(insert),
            Statement::Update(update) => writer.write_update(update),
            Statement::Delete(delete) => writer.write_delete(delete),
        };
        if let Err(err) = rendered {
            debug!(
                target: "quarry::compile",
                statement = statement.kind(),
                dialect = self.dialect.name(),
                error = %err,
                "compilation failed"
            );
            return Err(err);
        }

        let (sql, parameters) = writer.finish();
        debug!(
            target: "quarry::compile",
            statement = statement.kind(),
            dialect = self.dialect.name(),
            sql = %sql,
            parameters = parameters.len(),
            "compiled statement"
        );
        Ok(CompiledQuery { sql, parameters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, PostgresDialect};
    use crate::from::Table;
    use crate::types::SqlType;

    fn contacts() -> Table {
        Table::builder("contacts")
            .required("firstname", SqlType::Text)
            .required("lastname", SqlType::Text)
            .build()
    }

    #[test]
    fn test_options_from_json() {
        let options = CompileOptions::from_json(r#"{"quoting": "always"}"#).unwrap();
        assert_eq!(options.quoting, QuotingPolicy::Always);
        assert!(options.shorten_unambiguous_names);

        let options =
            CompileOptions::from_json(r#"{"shorten_unambiguous_names": false}"#).unwrap();
        assert!(!options.shorten_unambiguous_names);
        assert_eq!(options.quoting, QuotingPolicy::WhenNeeded);
    }

    #[test]
    fn test_options_from_bad_json() {
        let err = CompileOptions::from_json(r#"{"quoting": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let query = Select::from(&contacts())
            .columns(&["firstname"])
            .unwrap()
            .where_eq([("lastname", "Lee")])
            .unwrap();
        let compiler = Compiler::new(&PostgresDialect);
        assert_eq!(compiler.compile(&query).unwrap(), compiler.compile(&query).unwrap());
    }

    #[test]
    fn test_compile_with_dispatch() {
        let dialect = GenericDialect::new();
        let compiler = Compiler::new(&dialect).with_dispatch(Dispatch::none());
        let compiled = compiler.compile(&Select::from(&contacts())).unwrap();
        assert_eq!(compiled.sql, "SELECT FROM contacts");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_statement_kind() {
        let t = contacts();
        assert_eq!(Statement::from(&Select::from(&t)).kind(), "SELECT");
        assert_eq!(Statement::from(&Delete::from(&t)).kind(), "DELETE");
    }
}
