//! INSERT statement builder.

use super::clause::{FromClause, SelectItem, Selection};
use super::expr::Expr;
use super::select::Select;
use super::value::IntoOperand;
use crate::error::{Error, Result};
use crate::from::{Cte, Source, Table};

/// Where inserted rows come from.
#[derive(Debug, Clone)]
pub(crate) enum InsertSource {
    /// `DEFAULT VALUES`.
    DefaultValues,
    /// Literal rows, each a list of `(column, value)` pairs.
    Rows(Vec<Vec<(String, Expr)>>),
    /// `INSERT ... SELECT`.
    Query {
        columns: Vec<String>,
        query: Box<Select>,
    },
}

/// An INSERT statement under construction.
#[derive(Debug, Clone)]
pub struct Insert {
    pub(crate) with: Vec<Cte>,
    pub(crate) target: Table,
    pub(crate) source: InsertSource,
    pub(crate) returning: Vec<SelectItem>,
}

impl Insert {
    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn into(table: &Table) -> Self {
        Self {
            with: vec![],
            target: table.clone(),
            source: InsertSource::DefaultValues,
            returning: vec![],
        }
    }

    /// Adds a WITH item.
    #[must_use]
    pub fn with(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    /// Appends a row. Values are normalized to the column types; columns a
    /// row leaves out are rendered as `DEFAULT` when other rows set them.
    ///
    /// Replaces a source query set by [`Insert::from_query`].
    ///
    /// # Errors
    ///
    /// Every name must exist on the target and every required column must
    /// be present.
    pub fn values<I, K, V>(mut self, row: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        let mut resolved: Vec<(String, Expr)> = vec![];
        for (name, value) in row {
            let name = name.as_ref();
            let spec = self
                .target
                .column_spec(name)
                .ok_or_else(|| Error::UnknownInsertColumn {
                    column: String::from(name),
                    table: String::from(self.target.name()),
                })?;
            let expr = value.into_operand(&spec.sql_type);
            match resolved.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = expr,
                None => resolved.push((String::from(name), expr)),
            }
        }
        if let Some(missing) = self
            .target
            .required_columns()
            .find(|required| !resolved.iter().any(|(n, _)| n == required))
        {
            return Err(Error::MissingRequiredColumn {
                column: String::from(missing),
                table: String::from(self.target.name()),
            });
        }

        match &mut self.source {
            InsertSource::Rows(rows) => rows.push(resolved),
            other => *other = InsertSource::Rows(vec![resolved]),
        }
        Ok(self)
    }

    /// Inserts the rows produced by `query`. Every selected item must be a
    /// named expression whose name is a column of the target.
    ///
    /// # Errors
    ///
    /// Rejects an empty selection, `node.*` selections and names the target
    /// does not have.
    pub fn from_query(mut self, query: Select) -> Result<Self> {
        if query.items.is_empty() {
            return Err(Error::EmptyInsertSelection);
        }
        let mut columns = Vec::with_capacity(query.items.len());
        for item in &query.items {
            let SelectItem::Named(named) = item else {
                return Err(Error::AllColumnsInInsert);
            };
            if self.target.column_spec(named.name()).is_none() {
                return Err(Error::UnknownInsertColumn {
                    column: String::from(named.name()),
                    table: String::from(self.target.name()),
                });
            }
            columns.push(String::from(named.name()));
        }
        self.source = InsertSource::Query {
            columns,
            query: Box::new(query),
        };
        Ok(self)
    }

    /// Appends a RETURNING entry; bare names resolve against the target.
    ///
    /// # Errors
    ///
    /// Unnamed expressions and unknown column names are rejected.
    pub fn returning(mut self, item: impl Into<Selection>) -> Result<Self> {
        let from = FromClause::tracking(Source::Table(self.target.clone()));
        self.returning.push(SelectItem::resolve(item.into(), &from)?);
        Ok(self)
    }

    /// Appends several bare column names to RETURNING.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for an unknown name.
    pub fn returning_columns(mut self, names: &[&str]) -> Result<Self> {
        for name in names {
            self = self.returning(*name)?;
        }
        Ok(self)
    }

    /// Returns the target table.
    #[must_use]
    pub const fn target(&self) -> &Table {
        &self.target
    }

    /// Returns the number of literal rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match &self.source {
            InsertSource::Rows(rows) => rows.len(),
            InsertSource::DefaultValues | InsertSource::Query { .. } => 0,
        }
    }
}

/// Union of the column names of all rows, in order of first appearance.
pub(crate) fn row_columns(rows: &[Vec<(String, Expr)>]) -> Vec<&str> {
    let mut columns: Vec<&str> = vec![];
    for (name, _) in rows.iter().flatten() {
        if !columns.contains(&name.as_str()) {
            columns.push(name);
        }
    }
    columns
}
