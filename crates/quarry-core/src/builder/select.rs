//! SELECT statement builder.

use super::clause::{
    count_param, FromClause, Order, OrderItem, Predicate, SelectItem, SelectedColumns, Selection,
};
use super::expr::Expr;
use super::value::IntoOperand;
use crate::error::Result;
use crate::from::{ColumnSpec, Cte, DerivedTable, FromItem, JoinKind};

/// A SELECT statement under construction.
///
/// Clauses may be set in any order; the compiler emits them in SQL order.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub(crate) with: Vec<Cte>,
    pub(crate) distinct: bool,
    pub(crate) items: Vec<SelectItem>,
    pub(crate) from: FromClause,
    pub(crate) filter: Predicate,
    pub(crate) group_by: Vec<Expr>,
    pub(crate) having: Predicate,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) limit: Option<Expr>,
    pub(crate) offset: Option<Expr>,
}

impl Select {
    /// Creates a SELECT without a FROM clause.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a SELECT over `item`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(item: impl Into<FromItem>) -> Self {
        let mut select = Self::default();
        select.from.set_root(item.into());
        select
    }

    /// Adds a WITH item.
    #[must_use]
    pub fn with(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Appends a named expression, `node.*`, or a bare column name of the
    /// last introduced node.
    ///
    /// # Errors
    ///
    /// Unnamed expressions and unknown column names are rejected.
    pub fn select(mut self, item: impl Into<Selection>) -> Result<Self> {
        let item = SelectItem::resolve(item.into(), &self.from)?;
        self.items.push(item);
        Ok(self)
    }

    /// Appends several bare column names of the last introduced node.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
    pub fn columns(mut self, names: &[&str]) -> Result<Self> {
        for name in names {
            self = self.select(*name)?;
        }
        Ok(self)
    }

    /// Adds a join of the given kind.
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
    /// See [`Select::join`].
    pub fn inner_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Inner, Some(on))
    }

    /// Adds a LEFT JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
    pub fn left_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Left, Some(on))
    }

    /// Adds a FULL JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
    pub fn full_join(self, item: impl Into<FromItem>, on: Expr) -> Result<Self> {
        self.join(item, JoinKind::Full, Some(on))
    }

    /// Adds a CROSS JOIN.
    ///
    /// # Errors
    ///
    /// See [`Select::join`].
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

    /// ANDs `column = value` for every pair onto the WHERE clause. Names
    /// resolve against the last introduced node.
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
        if let Some(expr) = self.from.equalities(pairs)? {
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

    /// ANDs `NOT (a = $1 AND b = $2 ...)` onto the WHERE clause.
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
        if let Some(expr) = self.from.equalities(pairs)? {
            self.filter.and(expr.not(), "WHERE")?;
        }
        Ok(self)
    }

    /// Appends a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Appends a bare column of the last introduced node to GROUP BY.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
    pub fn group_by_column(mut self, name: &str) -> Result<Self> {
        let expr = self.from.resolve(name)?;
        self.group_by.push(expr);
        Ok(self)
    }

    /// Appends GROUP BY entries computed from the selected output names.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    pub fn group_by_selected<F>(mut self, f: F) -> Result<Self>
    where
        F: FnOnce(&SelectedColumns) -> Result<Vec<Expr>>,
    {
        let exprs = f(&SelectedColumns::new(&self.items))?;
        self.group_by.extend(exprs);
        Ok(self)
    }

    /// ANDs a boolean expression onto the HAVING clause.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotBoolean`] for a non-boolean expression.
    pub fn having(mut self, expr: Expr) -> Result<Self> {
        self.having.and(expr, "HAVING")?;
        Ok(self)
    }

    /// Appends an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, expr: Expr, order: Order) -> Self {
        self.order_by.push(OrderItem { expr, order });
        self
    }

    /// Appends a bare column of the last introduced node to ORDER BY.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownColumn`] for an unknown name.
    pub fn order_by_column(self, name: &str, order: Order) -> Result<Self> {
        let expr = self.from.resolve(name)?;
        Ok(self.order_by(expr, order))
    }

    /// Appends ORDER BY entries computed from the selected output names.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    pub fn order_by_selected<F>(mut self, f: F) -> Result<Self>
    where
        F: FnOnce(&SelectedColumns) -> Result<Vec<(Expr, Order)>>,
    {
        let entries = f(&SelectedColumns::new(&self.items))?;
        self.order_by
            .extend(entries.into_iter().map(|(expr, order)| OrderItem { expr, order }));
        Ok(self)
    }

    /// Sets LIMIT to a bound parameter.
    #[must_use]
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(count_param(n));
        self
    }

    /// Sets OFFSET to a bound parameter.
    #[must_use]
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(count_param(n));
        self
    }

    /// Sets LIMIT to an arbitrary expression.
    #[must_use]
    pub fn limit_expr(mut self, expr: Expr) -> Self {
        self.limit = Some(expr);
        self
    }

    /// Sets OFFSET to an arbitrary expression.
    #[must_use]
    pub fn offset_expr(mut self, expr: Expr) -> Self {
        self.offset = Some(expr);
        self
    }

    /// Wraps the query as a FROM item under `alias`.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> DerivedTable {
        DerivedTable::new(self, alias)
    }

    /// Wraps the query as a FROM item with an explicit column list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ColumnListMismatch`] on a length mismatch.
    pub fn alias_with_columns(
        self,
        alias: impl Into<String>,
        columns: Vec<ColumnSpec>,
    ) -> Result<DerivedTable> {
        DerivedTable::with_columns(self, alias, columns)
    }

    /// Returns the columns the query produces, in order.
    #[must_use]
    pub fn output_columns(&self) -> Vec<ColumnSpec> {
        self.items
            .iter()
            .flat_map(SelectItem::output_columns)
            .collect()
    }

    /// Returns the SELECT list.
    #[must_use]
    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    /// Returns the FROM root.
    #[must_use]
    pub const fn from_item(&self) -> Option<&FromItem> {
        self.from.root()
    }

    /// Returns the WHERE predicate.
    #[must_use]
    pub const fn where_predicate(&self) -> Option<&Expr> {
        self.filter.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{val, ExprKind};
    use crate::error::Error;
    use crate::from::Table;
    use crate::types::SqlType;

    fn contacts() -> Table {
        Table::builder("contacts")
            .required("firstname", SqlType::Text)
            .required("lastname", SqlType::Text)
            .optional("age", SqlType::Integer.nullable())
            .build()
    }

    #[test]
    fn test_columns_resolve_against_from() {
        let t = contacts();
        let select = Select::from(&t).columns(&["firstname", "age"]).unwrap();
        let out: Vec<String> = select.output_columns().into_iter().map(|c| c.name).collect();
        assert_eq!(out, ["firstname", "age"]);
    }

    #[test]
    fn test_unknown_column() {
        let err = Select::from(&contacts()).columns(&["email"]).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn test_bare_name_without_from() {
        let err = Select::new().select("firstname").unwrap_err();
        assert!(matches!(err, Error::NoSource(_)));
    }

    #[test]
    fn test_unnamed_expression_rejected() {
        let t = contacts();
        let err = Select::from(&t)
            .select(t.col("age").unwrap().add(1))
            .unwrap_err();
        assert!(matches!(err, Error::UnnamedExpression));
    }

    #[test]
    fn test_join_before_from_fails() {
        let err = Select::new().cross_join(&contacts()).unwrap_err();
        assert!(matches!(err, Error::NoPrimaryTable));
    }

    #[test]
    fn test_where_calls_conjoin() {
        let select = Select::from(&contacts())
            .where_eq([("firstname", "Ann")])
            .unwrap()
            .where_eq([("lastname", "Lee")])
            .unwrap();
        assert!(matches!(
            select.where_predicate().unwrap().kind(),
            ExprKind::Binary { .. }
        ));
    }

    #[test]
    fn test_where_eq_empty_is_noop() {
        let select = Select::from(&contacts())
            .where_eq(Vec::<(&str, i64)>::new())
            .unwrap();
        assert!(select.where_predicate().is_none());
    }

    #[test]
    fn test_where_rejects_non_boolean() {
        let err = Select::from(&contacts()).where_clause(val(1)).unwrap_err();
        assert!(matches!(err, Error::NotBoolean { .. }));
    }

    #[test]
    fn test_alias_with_columns_checks_length() {
        let t = contacts();
        let query = Select::from(&t).columns(&["firstname"]).unwrap();
        let err = query
            .alias_with_columns(
                "x",
                vec![
                    ColumnSpec::new("a", SqlType::Text),
                    ColumnSpec::new("b", SqlType::Text),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::ColumnListMismatch { expected: 1, found: 2 }));
    }

    #[test]
    fn test_derived_table_columns() {
        let t = contacts();
        let derived = Select::from(&t)
            .select(t.col("age").unwrap().max().as_("oldest"))
            .unwrap()
            .alias("stats");
        assert_eq!(derived.columns()[0].name, "oldest");
        assert!(derived.col("oldest").is_ok());
        assert!(derived.col("age").is_err());
    }
}
