//! DELETE statement builder.

use super::clause::{FromClause, Predicate, SelectItem, Selection};
use super::expr::Expr;
use super::value::IntoOperand;
use crate::error::Result;
use crate::from::{Cte, FromItem, JoinKind, Source, Table};

/// A DELETE statement under construction.
#[derive(Debug, Clone)]
pub struct Delete {
    pub(crate) with: Vec<Cte>,
    pub(crate) target: Table,
    pub(crate) using: FromClause,
    pub(crate) filter: Predicate,
    pub(crate) returning: Vec<SelectItem>,
}

impl Delete {
    /// Starts a DELETE from `table`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(table: &Table) -> Self {
        Self {
            with: vec![],
            target: table.clone(),
            using: FromClause::tracking(Source::Table(table.clone())),
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

    /// Sets the USING item.
    #[must_use]
    pub fn using(mut self, item: impl Into<FromItem>) -> Self {
        self.using.set_root(item.into());
        self
    }

    /// Adds a join to the USING item.
    ///
    /// # Errors
    ///
    /// Fails if no USING item was set or the condition does not fit the kind.
    pub fn join(mut self, item: impl Into<FromItem>, kind: JoinKind, on: Option<Expr>) -> Result<Self> {
        self.using.join(item.into(), kind, on)?;
        Ok(self)
    }

    /// Adds an INNER JOIN.
    ///
    /// # Errors
    ///
    /// See [`Delete::join`].
    pub fn inner_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Inner, Some(on))
    }

    /// Adds a LEFT JOIN.
    ///
    /// # Errors
    ///
    /// See [`Delete::join`].
    pub fn left_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Left, Some(on))
    }

    /// Adds a CROSS JOIN.
    ///
    /// # Errors
    ///
    /// See [`Delete::join`].
    pub fn cross_join(self, item: impl Into<FromItem>) -> Result<Self> {
        self.join(item, JoinKind::Cross, None)
    }

    /// ANDs a boolean expression onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotBoolean`] for a non-boolean expression.
    pub fn where_clause(mut self, expr: Expr) -> Result<Self> {
        self.filter.and(expr, "WHERE")?;
        Ok(self)
    }

    /// ANDs `column = value` for every pair onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
    pub fn where_eq<I, K, V>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        if let Some(expr) = self.using.equalities(pairs)? {
            self.filter.and(expr, "WHERE")?;
        }
        Ok(self)
    }

    /// ANDs `NOT (expr)` onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotBoolean`] for a non-boolean expression.
    pub fn where_not(mut self, expr: Expr) -> Result<Self> {
        self.filter.and_not(expr, "WHERE")?;
        Ok(self)
    }

    /// ANDs `NOT (a = $1 AND ...)` onto the WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
    pub fn where_not_eq<I, K, V>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        if let Some(expr) = self.using.equalities(pairs)? {
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
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::SqlType;

    fn sessions() -> Table {
        Table::builder("sessions")
            .required("id", SqlType::Integer)
            .required("user_id", SqlType::Integer)
            .build()
    }

    #[test]
    fn test_where_eq_resolves_against_target() {
        let delete = Delete::from(&sessions()).where_eq([("id", 3)]).unwrap();
        assert!(delete.filter.get().is_some());
    }

    #[test]
    fn test_where_eq_unknown_column() {
        let err = Delete::from(&sessions())
            .where_eq([("token", "x")])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn test_join_without_using() {
        let err = Delete::from(&sessions()).cross_join(&sessions()).unwrap_err();
        assert!(matches!(err, Error::NoPrimaryTable));
    }

    #[test]
    fn test_returning_unnamed_rejected() {
        let s = sessions();
        let err = Delete::from(&s)
            .returning(s.col("id").unwrap().add(1))
            .unwrap_err();
        assert!(matches!(err, Error::UnnamedExpression));
    }
}
