//! Output buffer and name scopes used while rendering a statement.

use std::collections::HashMap;

use tracing::trace;

use super::{CompileOptions, QuotingPolicy};
use crate::builder::value::SqlValue;
use crate::builder::ColumnRef;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::from::{Source, SourceId};

/// The nodes visible to one (sub)statement.
#[derive(Debug, Default)]
struct Scope {
    qualifiers: HashMap<SourceId, String>,
    name_counts: HashMap<String, usize>,
}

impl Scope {
    fn new<'a>(sources: impl IntoIterator<Item = &'a Source>) -> Self {
        let mut scope = Self::default();
        for source in sources {
            scope
                .qualifiers
                .entry(source.id())
                .or_insert_with(|| String::from(source.qualifier()));
            for column in source.columns() {
                *scope.name_counts.entry(column.name.clone()).or_default() += 1;
            }
        }
        scope
    }
}

/// Accumulates SQL text and bound parameters.
///
/// Parameters are pushed at the moment their placeholder is written, so
/// placeholder order always equals parameter order.
pub(crate) struct SqlWriter<'a> {
    dialect: &'a dyn Dialect,
    options: &'a CompileOptions,
    sql: String,
    params: Vec<SqlValue>,
    scopes: Vec<Scope>,
}

impl<'a> SqlWriter<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect, options: &'a CompileOptions) -> Self {
        Self {
            dialect,
            options,
            sql: String::new(),
            params: vec![],
            scopes: vec![],
        }
    }

    pub(crate) fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Binds a wire value and writes its placeholder.
    pub(crate) fn push_param(&mut self, value: SqlValue) {
        let placeholder = self.dialect.parameter_placeholder(self.params.len() + 1);
        self.sql.push_str(&placeholder);
        self.params.push(value);
    }

    /// Writes an identifier, quoted when required by the dialect or policy.
    pub(crate) fn push_identifier(&mut self, name: &str) {
        let quote = self.options.quoting == QuotingPolicy::Always || self.dialect.needs_quoting(name);
        if quote {
            let quoted = self.dialect.quote_identifier(name);
            self.sql.push_str(&quoted);
        } else {
            self.sql.push_str(name);
        }
    }

    /// Writes `items` separated by `sep`.
    pub(crate) fn push_list<T>(
        &mut self,
        items: &[T],
        sep: &str,
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            write(self, item)?;
        }
        Ok(())
    }

    /// Makes `sources` the innermost scope.
    pub(crate) fn enter_scope<'s>(&mut self, sources: impl IntoIterator<Item = &'s Source>) {
        let scope = Scope::new(sources);
        trace!(
            target: "quarry::compile",
            depth = self.scopes.len() + 1,
            sources = scope.qualifiers.len(),
            "entering scope"
        );
        self.scopes.push(scope);
    }

    pub(crate) fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Writes a column reference.
    ///
    /// Columns of the innermost scope render bare when their name is unique
    /// there and shortening is enabled. Columns of enclosing scopes always
    /// render qualified.
    pub(crate) fn push_column(&mut self, column: &ColumnRef) -> Result<()> {
        let innermost = self.scopes.len().saturating_sub(1);
        let (depth, scope) = self
            .scopes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, scope)| scope.qualifiers.contains_key(&column.source))
            .ok_or_else(|| Error::UnknownSource(column.name.clone()))?;

        let unique = scope.name_counts.get(&column.name).copied() == Some(1);
        let qualifier = if depth == innermost && unique && self.options.shorten_unambiguous_names {
            None
        } else {
            scope.qualifiers.get(&column.source).cloned()
        };

        if let Some(qualifier) = qualifier {
            self.push_identifier(&qualifier);
            self.push_str(".");
        }
        self.push_identifier(&column.name);
        Ok(())
    }

    pub(crate) fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, PostgresDialect};
    use crate::from::Table;
    use crate::types::SqlType;

    fn people() -> Table {
        Table::builder("people")
            .required("id", SqlType::Integer)
            .required("name", SqlType::Text)
            .build()
    }

    fn column(table: &Table, name: &str) -> ColumnRef {
        table.col(name).unwrap().as_column().unwrap().clone()
    }

    #[test]
    fn test_placeholders_follow_push_order() {
        let options = CompileOptions::default();
        let mut w = SqlWriter::new(&PostgresDialect, &options);
        w.push_param(SqlValue::Int(1));
        w.push_str(", ");
        w.push_param(SqlValue::Int(2));
        let (sql, params) = w.finish();
        assert_eq!(sql, "$1, $2");
        assert_eq!(params, [SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_identifier_quoting_policy() {
        let dialect = GenericDialect::new();
        let options = CompileOptions::default();
        let mut w = SqlWriter::new(&dialect, &options);
        w.push_identifier("name");
        w.push_str(" ");
        w.push_identifier("order");
        w.push_str(" ");
        w.push_identifier("Mixed Case");
        assert_eq!(w.finish().0, r#"name "order" "Mixed Case""#);

        let always = CompileOptions {
            quoting: QuotingPolicy::Always,
            ..CompileOptions::default()
        };
        let mut w = SqlWriter::new(&dialect, &always);
        w.push_identifier("name");
        assert_eq!(w.finish().0, r#""name""#);
    }

    #[test]
    fn test_column_disambiguation() {
        let p = people();
        let q = p.aliased("q");
        let options = CompileOptions::default();
        let dialect = GenericDialect::new();
        let mut w = SqlWriter::new(&dialect, &options);
        let sources = [Source::Table(p.clone()), Source::Table(q.clone())];
        w.enter_scope(&sources);
        w.push_column(&column(&p, "id")).unwrap();
        w.push_str(" ");
        w.push_column(&column(&q, "name")).unwrap();
        assert_eq!(w.finish().0, "people.id q.name");
    }

    #[test]
    fn test_outer_scope_columns_are_qualified() {
        let p = people();
        let inner = Table::builder("pets").required("owner", SqlType::Integer).build();
        let options = CompileOptions::default();
        let dialect = GenericDialect::new();
        let mut w = SqlWriter::new(&dialect, &options);
        w.enter_scope([&Source::Table(p.clone())]);
        w.enter_scope([&Source::Table(inner.clone())]);
        w.push_column(&column(&inner, "owner")).unwrap();
        w.push_str(" = ");
        w.push_column(&column(&p, "id")).unwrap();
        w.exit_scope();
        w.exit_scope();
        assert_eq!(w.finish().0, "owner = people.id");
    }

    #[test]
    fn test_unknown_source() {
        let options = CompileOptions::default();
        let dialect = GenericDialect::new();
        let mut w = SqlWriter::new(&dialect, &options);
        w.enter_scope([&Source::Table(people())]);
        let err = w.push_column(&column(&people(), "id")).unwrap_err();
        assert!(matches!(err, Error::UnknownSource(name) if name == "id"));
    }

    #[test]
    fn test_shortening_disabled_qualifies_everything() {
        let p = people();
        let options = CompileOptions {
            shorten_unambiguous_names: false,
            ..CompileOptions::default()
        };
        let dialect = GenericDialect::new();
        let mut w = SqlWriter::new(&dialect, &options);
        w.enter_scope([&Source::Table(p.clone())]);
        w.push_column(&column(&p, "id")).unwrap();
        assert_eq!(w.finish().0, "people.id");
    }
}
