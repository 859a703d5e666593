//! Clause state shared by the statement builders.
//!
//! `FromClause` and `Predicate` are embedded in every builder that has a FROM
//! graph or a WHERE predicate, so joins and predicate accumulation behave the
//! same for SELECT, UPDATE and DELETE.

use std::collections::HashSet;

use super::expr::{Expr, ExprKind, NamedExpr};
use super::value::IntoOperand;
use crate::error::{Error, Result};
use crate::from::{AllColumns, ColumnSpec, FromItem, Join, JoinKind, Source};
use crate::types::SqlType;

/// A FROM graph under construction plus the node bare column names resolve
/// against.
#[derive(Debug, Clone, Default)]
pub(crate) struct FromClause {
    root: Option<FromItem>,
    tracked: Option<Source>,
}

impl FromClause {
    /// A clause with no root that resolves names against `source`.
    pub(crate) fn tracking(source: Source) -> Self {
        Self {
            root: None,
            tracked: Some(source),
        }
    }

    pub(crate) const fn root(&self) -> Option<&FromItem> {
        self.root.as_ref()
    }

    /// Replaces the root.
    pub(crate) fn set_root(&mut self, item: FromItem) {
        self.tracked = Some(item.rightmost().clone());
        self.root = Some(item);
    }

    /// Joins `item` onto the root; `item` becomes the tracked node.
    pub(crate) fn join(&mut self, item: FromItem, kind: JoinKind, on: Option<Expr>) -> Result<()> {
        let root = self.root.clone().ok_or(Error::NoPrimaryTable)?;
        let tracked = item.rightmost().clone();
        let join = Join::new(root, item, kind, on)?;
        self.root = Some(join.into());
        self.tracked = Some(tracked);
        Ok(())
    }

    /// Resolves a bare column name against the tracked node.
    pub(crate) fn resolve(&self, name: &str) -> Result<Expr> {
        self.tracked
            .as_ref()
            .ok_or_else(|| Error::NoSource(String::from(name)))?
            .col(name)
    }

    /// Builds `a = $1 AND b = $2 ...` from name/value pairs.
    pub(crate) fn equalities<I, K, V>(&self, pairs: I) -> Result<Option<Expr>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoOperand,
    {
        let mut conjunction: Option<Expr> = None;
        for (name, value) in pairs {
            let eq = self.resolve(name.as_ref())?.eq(value);
            conjunction = Some(match conjunction {
                Some(acc) => acc.and(eq),
                None => eq,
            });
        }
        Ok(conjunction)
    }
}

/// A predicate that grows by conjunction.
#[derive(Debug, Clone, Default)]
pub(crate) struct Predicate(Option<Expr>);

impl Predicate {
    pub(crate) const fn get(&self) -> Option<&Expr> {
        self.0.as_ref()
    }

    /// ANDs `expr` onto the existing predicate.
    pub(crate) fn and(&mut self, expr: Expr, context: &'static str) -> Result<()> {
        ensure_boolean(&expr, context)?;
        self.0 = Some(match self.0.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        Ok(())
    }

    /// ANDs `NOT expr` onto the existing predicate; `expr` must be boolean.
    pub(crate) fn and_not(&mut self, expr: Expr, context: &'static str) -> Result<()> {
        ensure_boolean(&expr, context)?;
        self.and(expr.not(), context)
    }
}

fn ensure_boolean(expr: &Expr, context: &'static str) -> Result<()> {
    if expr.sql_type().is_boolean() {
        Ok(())
    } else {
        Err(Error::NotBoolean {
            context,
            found: expr.sql_type().to_string(),
        })
    }
}

/// Anything that may be passed to `select` or `returning`.
#[derive(Debug, Clone)]
pub enum Selection {
    /// An unnamed expression; always rejected.
    Expr(Expr),
    /// A named expression.
    Named(NamedExpr),
    /// Every column of a node.
    All(AllColumns),
    /// A bare column name of the tracked node.
    Column(String),
}

impl From<Expr> for Selection {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<NamedExpr> for Selection {
    fn from(named: NamedExpr) -> Self {
        Self::Named(named)
    }
}

impl From<AllColumns> for Selection {
    fn from(all: AllColumns) -> Self {
        Self::All(all)
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Self::Column(String::from(name))
    }
}

impl From<String> for Selection {
    fn from(name: String) -> Self {
        Self::Column(name)
    }
}

/// A resolved entry of a SELECT or RETURNING list.
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// `expr [AS name]`.
    Named(NamedExpr),
    /// Every column of a node.
    All(AllColumns),
}

impl SelectItem {
    /// Resolves a selection; bare names are looked up in `from`.
    pub(crate) fn resolve(selection: Selection, from: &FromClause) -> Result<Self> {
        match selection {
            Selection::Expr(_) => Err(Error::UnnamedExpression),
            Selection::Named(named) => Ok(Self::Named(named)),
            Selection::All(all) => Ok(Self::All(all)),
            Selection::Column(name) => {
                let expr = from.resolve(&name)?;
                Ok(Self::Named(expr.as_(name)))
            }
        }
    }

    /// Returns the output columns this entry produces.
    #[must_use]
    pub fn output_columns(&self) -> Vec<ColumnSpec> {
        match self {
            Self::Named(named) => vec![ColumnSpec::new(named.name(), named.sql_type().clone())],
            Self::All(all) => all
                .columns()
                .into_iter()
                .map(|(name, expr)| ColumnSpec::new(name, expr.sql_type().clone()))
                .collect(),
        }
    }
}

/// The output names of a SELECT list, handed to the `*_selected` callbacks.
#[derive(Debug, Clone)]
pub struct SelectedColumns {
    columns: Vec<ColumnSpec>,
}

impl SelectedColumns {
    pub(crate) fn new(items: &[SelectItem]) -> Self {
        let mut seen = HashSet::new();
        let columns = items
            .iter()
            .flat_map(SelectItem::output_columns)
            .filter(|c| seen.insert(c.name.clone()))
            .collect();
        Self { columns }
    }

    /// Returns an expression referring to a selected output name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if nothing was selected under `name`.
    pub fn get(&self, name: &str) -> Result<Expr> {
        let spec = self
            .columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn {
                column: String::from(name),
                relation: String::from("selected columns"),
            })?;
        Ok(Expr::new(
            ExprKind::SelectedRef(spec.name.clone()),
            spec.sql_type.clone(),
        ))
    }

    /// Returns the selected names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Ascending (the SQL default; rendered without a keyword).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// An ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// The sort key.
    pub expr: Expr,
    /// The direction.
    pub order: Order,
}

/// Builds an `Integer` bound parameter for LIMIT / OFFSET.
pub(crate) fn count_param(n: i64) -> Expr {
    Expr::value_of(n.into(), SqlType::Integer, false)
}
