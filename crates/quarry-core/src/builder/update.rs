//! UPDATE statement builder.

use super::clause::{FromClause, Predicate, SelectItem, Selection};
use super::expr::Expr;
use super::value::IntoOperand;
use crate::error::{Error, Result};
use crate::from::{Cte, FromItem, JoinKind, Source, Table};

/// An UPDATE statement under construction.
///
/// Bare column names resolve against the target until a FROM item is added,
/// then against the most recently introduced node.
#[derive(Debug, Clone)]
pub struct Update {
    pub(crate) with: Vec<Cte>,
    pub(crate) target: Table,
    pub(crate) assignments: Vec<(String, Expr)>,
    pub(crate) from: FromClause,
    pub(crate) filter: Predicate,
    pub(crate) returning: Vec<SelectItem>,
}

impl Update {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(table: &Table) -> Self {
        Self {
            with: vec![],
            target: table.clone(),
            assignments: vec![],
            from: FromClause::tracking(Source::Table(table.clone())),
            filter: Predicate::default(),
            returning: vec![],
        }
    }

    /// Adds a WITH item.
    #[must_use]
    pub fn with(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    /// Assigns a value to a target column. Plain values take the column's
    /// type. Assigning the same column twice keeps the last value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the target has no such column.
    pub fn set(mut self, name: &str, value: impl IntoOperand) -> Result<Self> {
        let spec = self
            .target
            .column_spec(name)
            .ok_or_else(|| Error::UnknownColumn {
                column: String::from(name),
                relation: String::from(self.target.qualifier()),
            })?;
        let expr = value.into_operand(&spec.sql_type);
        match self.assignments.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = expr,
            None => self.assignments.push((String::from(name), expr)),
        }
        Ok(self)
    }

    /// Assigns several columns.
    ///
    /// # Errors
    ///
    /// See [`Update::set`].
    pub fn set_all<I, K, V>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        for (name, value) in pairs {
            self = self.set(name.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Sets the FROM item joined with the target.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(mut self, item: impl Into<FromItem>) -> Self {
        self.from.set_root(item.into());
        self
    }

    /// Adds a join to the FROM item.
    ///
    /// # Errors
    ///
    /// Fails if no FROM item was set or the condition does not fit the kind.
    pub fn join(mut self, item: impl Into<FromItem>, kind: JoinKind, on: Option<Expr>) -> Result<Self> {
        self.from.join(item.into(), kind, on)?;
        Ok(self)
    }

    /// Adds an INNER JOIN.
    ///
    /// # Errors
    ///
    /// See [`Update::join`].
    pub fn inner_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Inner, Some(on))
    }

    /// Adds a LEFT JOIN.
    ///
    /// # Errors
    ///
    /// See [`Update::join`].
    pub fn left_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Left, Some(on))
    }

    /// Adds a CROSS JOIN.
    ///
    /// # Errors
    ///
    /// See [`Update::join`].
    pub fn cross_join(self, item: impl Into<FromItem>) -> Result<Self> {
        self.join(item, JoinKind::Cross, None)
    }

    /// ANDs a boolean expression onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBoolean`] for a non-boolean expression.
    pub fn where_clause(mut self, expr: Expr) -> Result<Self> {
        self.filter.and(expr, "WHERE")?;
        Ok(self)
    }

    /// ANDs `column = value` for every pair onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for an unknown name.
    pub fn where_eq<I, K, V>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        if let Some(expr) = self.from.equalities(pairs)? {
            self.filter.and(expr, "WHERE")?;
        }
        Ok(self)
    }

    /// ANDs `NOT (expr)` onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBoolean`] for a non-boolean expression.
    pub fn where_not(mut self, expr: Expr) -> Result<Self> {
        self.filter.and_not(expr, "WHERE")?;
        Ok(self)
    }

    /// ANDs `NOT (a = $1 AND ...)` onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for an unknown name.
    pub fn where_not_eq<I, K, V>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        if let Some(expr) = self.from.equalities(pairs)? {
            self.filter.and(expr.not(), "WHERE")?;
        }
        Ok(self)
    }

    /// Appends a RETURNING entry; bare names resolve against the target.
    ///
    /// # Errors
    ///
    /// Unnamed expressions and unknown column names are rejected.
    pub fn returning(mut self, item: impl Into<Selection>) -> Result<Self> {
        let target = FromClause::tracking(Source::Table(self.target.clone()));
        self.returning.push(SelectItem::resolve(item.into(), &target)?);
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

    /// Returns the assigned column names in order.
    pub fn assigned_columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(name, _)| name.as_str())
    }
}
