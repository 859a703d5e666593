//! Expression model.
//!
//! An [`Expr`] is an immutable, reference-counted AST node tagged with a
//! [`SqlType`]. Deriving a new expression never mutates its inputs, so the
//! same node can appear in any number of predicates or statements.

use std::sync::Arc;

use super::select::Select;
use super::value::{IntoOperand, SqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::from::SourceId;
use crate::types::SqlType;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // String
    Concat,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Returns the precedence level of the operator (lower = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Mod => 2,
            Self::Add | Self::Sub | Self::Concat => 3,
            Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Like
            | Self::NotLike => 4,
            Self::And => 6,
            Self::Or => 7,
        }
    }

    /// Returns true if `a op (b op c)` equals `(a op b) op c`.
    #[must_use]
    pub const fn is_associative(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::Concat | Self::And | Self::Or
        )
    }

    /// Returns true for `+ - * / %`.
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }

    /// Returns true if `self` and `other` are `||` and arithmetic, in either
    /// order. SQLite binds `||` tighter than `*`; PostgreSQL binds it looser
    /// than `+`.
    #[must_use]
    pub const fn mixes_with(&self, other: Self) -> bool {
        (matches!(self, Self::Concat) && other.is_arithmetic())
            || (self.is_arithmetic() && matches!(other, Self::Concat))
    }

    /// Returns true for operators whose operands may not chain at the same
    /// level without parentheses (`a = b = c` is rejected by most engines).
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        self.precedence() == 4
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
    /// Arithmetic negation.
    Neg,
    /// `IS NULL` (postfix).
    IsNull,
    /// `IS NOT NULL` (postfix).
    IsNotNull,
}

impl UnaryOp {
    /// Returns the precedence level of the operator.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Neg => 1,
            Self::IsNull | Self::IsNotNull => 4,
            Self::Not => 5,
        }
    }
}

/// A reference from a column expression to the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// The owning from-graph node.
    pub source: SourceId,
    /// Column name.
    pub name: String,
}

/// A function call expression.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    /// The function name, rendered verbatim.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
    /// Renders `name(*)` instead of the argument list.
    pub wildcard: bool,
}

/// The variants of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A literal. Bound as a parameter unless `inline` is set.
    Value {
        /// The raw value, serialized through the node's type at compile time.
        value: SqlValue,
        /// Render as an escaped literal instead of a placeholder.
        inline: bool,
    },

    /// A column of a from-graph node.
    Column(ColumnRef),

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Expr,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Expr,
    },

    /// A prefix or postfix unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Expr,
    },

    /// A function call.
    Function(FunctionCall),

    /// `CAST(expr AS type)`; the target is the node's own type.
    Cast(Expr),

    /// `expr [NOT] IN (list)`. An empty list is valid.
    InList {
        /// The tested expression.
        expr: Expr,
        /// The candidates.
        list: Vec<Expr>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// `expr [NOT] IN (subquery)`.
    InQuery {
        /// The tested expression.
        expr: Expr,
        /// The single-column subquery.
        query: Box<Select>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// `[NOT] EXISTS (subquery)`.
    Exists {
        /// The subquery.
        query: Box<Select>,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },

    /// A scalar subquery.
    Subquery(Box<Select>),

    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        /// The tested expression.
        expr: Expr,
        /// Lower bound.
        low: Expr,
        /// Upper bound.
        high: Expr,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// A reference to a SELECT output name.
    SelectedRef(String),

    /// The `DEFAULT` keyword.
    Default,
}

/// An immutable expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    kind: Arc<ExprKind>,
    ty: SqlType,
}

impl Expr {
    /// Creates a node. Every node carries a type.
    #[must_use]
    pub fn new(kind: ExprKind, ty: SqlType) -> Self {
        Self {
            kind: Arc::new(kind),
            ty,
        }
    }

    /// Creates a literal of the given type.
    #[must_use]
    pub fn value_of(value: SqlValue, ty: SqlType, inline: bool) -> Self {
        Self::new(ExprKind::Value { value, inline }, ty)
    }

    /// Creates a column reference.
    #[must_use]
    pub fn column(source: SourceId, name: impl Into<String>, ty: SqlType) -> Self {
        Self::new(
            ExprKind::Column(ColumnRef {
                source,
                name: name.into(),
            }),
            ty,
        )
    }

    /// Creates a function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Self>, ty: SqlType) -> Self {
        Self::new(
            ExprKind::Function(FunctionCall {
                name: name.into(),
                args,
                distinct: false,
                wildcard: false,
            }),
            ty,
        )
    }

    /// The `DEFAULT` keyword, typed for the column it is assigned to.
    #[must_use]
    pub fn default_value(ty: SqlType) -> Self {
        Self::new(ExprKind::Default, ty)
    }

    /// A scalar subquery. The query must select exactly one column; the
    /// result is nullable because the subquery may return no rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScalarSubquery`] for any other column count.
    pub fn subquery(query: Select) -> Result<Self> {
        let ty = single_column_type(&query)?;
        Ok(Self::new(ExprKind::Subquery(Box::new(query)), ty.nullable()))
    }

    /// Returns the node variant.
    #[must_use]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Returns the result type.
    #[must_use]
    pub const fn sql_type(&self) -> &SqlType {
        &self.ty
    }

    /// Returns the precedence level (lower = binds tighter).
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self.kind() {
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::Unary { op, .. } => op.precedence(),
            ExprKind::InList { list, .. } if list.is_empty() => 0,
            ExprKind::InList { .. } | ExprKind::InQuery { .. } | ExprKind::Between { .. } => 4,
            ExprKind::Exists { negated: true, .. } => UnaryOp::Not.precedence(),
            ExprKind::Value { .. }
            | ExprKind::Column(_)
            | ExprKind::Function(_)
            | ExprKind::Cast(_)
            | ExprKind::Exists { .. }
            | ExprKind::Subquery(_)
            | ExprKind::SelectedRef(_)
            | ExprKind::Default => 0,
        }
    }

    /// Returns the column reference if this is a column node.
    #[must_use]
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self.kind() {
            ExprKind::Column(c) => Some(c),
            _ => None,
        }
    }

    fn binary(self, op: BinaryOp, right: Self, ty: SqlType) -> Self {
        Self::new(
            ExprKind::Binary {
                left: self,
                op,
                right,
            },
            ty,
        )
    }

    fn compare<T: IntoOperand>(self, op: BinaryOp, value: T) -> Self {
        let right = value.into_operand(&self.ty);
        self.binary(op, right, SqlType::Boolean)
    }

    fn unary(self, op: UnaryOp, ty: SqlType) -> Self {
        Self::new(ExprKind::Unary { op, operand: self }, ty)
    }

    fn call(self, name: &str, ty: SqlType) -> Self {
        Self::function(name, vec![self], ty)
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::Eq, value)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::NotEq, value)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::Lt, value)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::LtEq, value)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::Gt, value)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq<T: IntoOperand>(self, value: T) -> Self {
        self.compare(BinaryOp::GtEq, value)
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like<T: IntoOperand>(self, pattern: T) -> Self {
        self.compare(BinaryOp::Like, pattern)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like<T: IntoOperand>(self, pattern: T) -> Self {
        self.compare(BinaryOp::NotLike, pattern)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        self.unary(UnaryOp::IsNull, SqlType::Boolean)
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        self.unary(UnaryOp::IsNotNull, SqlType::Boolean)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.binary(BinaryOp::And, other, SqlType::Boolean)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.binary(BinaryOp::Or, other, SqlType::Boolean)
    }

    /// Negates the expression with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.unary(UnaryOp::Not, SqlType::Boolean)
    }

    /// Arithmetic negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Self {
        let ty = self.ty.clone();
        self.unary(UnaryOp::Neg, ty)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between<L: IntoOperand, H: IntoOperand>(self, low: L, high: H) -> Self {
        self.between_impl(low, high, false)
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between<L: IntoOperand, H: IntoOperand>(self, low: L, high: H) -> Self {
        self.between_impl(low, high, true)
    }

    fn between_impl<L: IntoOperand, H: IntoOperand>(self, low: L, high: H, negated: bool) -> Self {
        let low = low.into_operand(&self.ty);
        let high = high.into_operand(&self.ty);
        Self::new(
            ExprKind::Between {
                expr: self,
                low,
                high,
                negated,
            },
            SqlType::Boolean,
        )
    }

    /// Creates an IN expression. An empty list compiles to `false`.
    #[must_use]
    pub fn is_in<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        self.in_list_impl(values, false)
    }

    /// Creates a NOT IN expression. An empty list compiles to `true`.
    #[must_use]
    pub fn not_in<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        self.in_list_impl(values, true)
    }

    fn in_list_impl<I, T>(self, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        let list = values
            .into_iter()
            .map(|v| v.into_operand(&self.ty))
            .collect();
        Self::new(
            ExprKind::InList {
                expr: self,
                list,
                negated,
            },
            SqlType::Boolean,
        )
    }

    /// Creates an `IN (subquery)` expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScalarSubquery`] unless the query selects one column.
    pub fn is_in_query(self, query: Select) -> Result<Self> {
        self.in_query_impl(query, false)
    }

    /// Creates a `NOT IN (subquery)` expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScalarSubquery`] unless the query selects one column.
    pub fn not_in_query(self, query: Select) -> Result<Self> {
        self.in_query_impl(query, true)
    }

    fn in_query_impl(self, query: Select, negated: bool) -> Result<Self> {
        single_column_type(&query)?;
        Ok(Self::new(
            ExprKind::InQuery {
                expr: self,
                query: Box::new(query),
                negated,
            },
            SqlType::Boolean,
        ))
    }

    /// Addition.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add<T: IntoOperand>(self, value: T) -> Self {
        self.arithmetic(BinaryOp::Add, value)
    }

    /// Subtraction.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn sub<T: IntoOperand>(self, value: T) -> Self {
        self.arithmetic(BinaryOp::Sub, value)
    }

    /// Multiplication.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn mul<T: IntoOperand>(self, value: T) -> Self {
        self.arithmetic(BinaryOp::Mul, value)
    }

    /// Division.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn div<T: IntoOperand>(self, value: T) -> Self {
        self.arithmetic(BinaryOp::Div, value)
    }

    /// Remainder.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn rem<T: IntoOperand>(self, value: T) -> Self {
        self.arithmetic(BinaryOp::Mod, value)
    }

    fn arithmetic<T: IntoOperand>(self, op: BinaryOp, value: T) -> Self {
        let right = value.into_operand(&self.ty);
        let ty = self.ty.clone();
        self.binary(op, right, ty)
    }

    /// String concatenation (`||`).
    #[must_use]
    pub fn concat<T: IntoOperand>(self, value: T) -> Self {
        let right = value.into_operand(&SqlType::Text);
        self.binary(BinaryOp::Concat, right, SqlType::Text)
    }

    /// `lower(expr)`.
    #[must_use]
    pub fn lower(self) -> Self {
        let ty = self.ty.clone();
        self.call("lower", ty)
    }

    /// `upper(expr)`.
    #[must_use]
    pub fn upper(self) -> Self {
        let ty = self.ty.clone();
        self.call("upper", ty)
    }

    /// `trim(expr)`.
    #[must_use]
    pub fn trim(self) -> Self {
        let ty = self.ty.clone();
        self.call("trim", ty)
    }

    /// `length(expr)`.
    #[must_use]
    pub fn length(self) -> Self {
        self.call("length", SqlType::Integer)
    }

    /// `coalesce(expr, fallback)`; the result takes the fallback's nullability.
    #[must_use]
    pub fn coalesce<T: IntoOperand>(self, fallback: T) -> Self {
        let fallback = fallback.into_operand(self.ty.base());
        let ty = fallback.ty.clone();
        Self::function("coalesce", vec![self, fallback], ty)
    }

    /// `count(expr)`.
    #[must_use]
    pub fn count(self) -> Self {
        self.call("count", SqlType::Integer)
    }

    /// `count(DISTINCT expr)`.
    #[must_use]
    pub fn count_distinct(self) -> Self {
        Self::new(
            ExprKind::Function(FunctionCall {
                name: String::from("count"),
                args: vec![self],
                distinct: true,
                wildcard: false,
            }),
            SqlType::Integer,
        )
    }

    /// `sum(expr)`; NULL over an empty set.
    #[must_use]
    pub fn sum(self) -> Self {
        let ty = self.ty.clone().nullable();
        self.call("sum", ty)
    }

    /// `avg(expr)`; NULL over an empty set.
    #[must_use]
    pub fn avg(self) -> Self {
        self.call("avg", SqlType::Float.nullable())
    }

    /// `min(expr)`; NULL over an empty set.
    #[must_use]
    pub fn min(self) -> Self {
        let ty = self.ty.clone().nullable();
        self.call("min", ty)
    }

    /// `max(expr)`; NULL over an empty set.
    #[must_use]
    pub fn max(self) -> Self {
        let ty = self.ty.clone().nullable();
        self.call("max", ty)
    }

    /// `CAST(expr AS type)`.
    #[must_use]
    pub fn cast(self, target: SqlType) -> Self {
        Self::new(ExprKind::Cast(self), target)
    }

    /// Gives the expression an output name for SELECT or RETURNING.
    #[must_use]
    pub fn as_(self, name: impl Into<String>) -> NamedExpr {
        NamedExpr {
            name: name.into(),
            expr: self,
        }
    }
}

fn single_column_type(query: &Select) -> Result<SqlType> {
    let columns = query.output_columns();
    match columns.as_slice() {
        [only] => Ok(only.sql_type.clone()),
        other => Err(Error::ScalarSubquery(other.len())),
    }
}

/// An expression with an output name.
#[derive(Debug, Clone)]
pub struct NamedExpr {
    name: String,
    expr: Expr,
}

impl NamedExpr {
    /// Returns the output name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wrapped expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the type of the wrapped expression.
    #[must_use]
    pub const fn sql_type(&self) -> &SqlType {
        self.expr.sql_type()
    }
}

/// A bound parameter whose type is inferred from the value.
#[must_use]
pub fn val<T: ToSqlValue>(value: T) -> Expr {
    let value = value.to_sql_value();
    let ty = value.inferred_type();
    Expr::value_of(value, ty, false)
}

/// A bound parameter of an explicit type.
#[must_use]
pub fn val_as<T: ToSqlValue>(value: T, ty: SqlType) -> Expr {
    Expr::value_of(value.to_sql_value(), ty, false)
}

/// A literal rendered into the SQL text through the dialect's escaper
/// instead of being bound.
#[must_use]
pub fn inline<T: ToSqlValue>(value: T) -> Expr {
    let value = value.to_sql_value();
    let ty = value.inferred_type();
    Expr::value_of(value, ty, true)
}

/// `count(*)`.
#[must_use]
pub fn count_all() -> Expr {
    Expr::new(
        ExprKind::Function(FunctionCall {
            name: String::from("count"),
            args: vec![],
            distinct: false,
            wildcard: true,
        }),
        SqlType::Integer,
    )
}

/// `EXISTS (query)`.
#[must_use]
pub fn exists(query: Select) -> Expr {
    Expr::new(
        ExprKind::Exists {
            query: Box::new(query),
            negated: false,
        },
        SqlType::Boolean,
    )
}

/// `NOT EXISTS (query)`.
#[must_use]
pub fn not_exists(query: Select) -> Expr {
    Expr::new(
        ExprKind::Exists {
            query: Box::new(query),
            negated: true,
        },
        SqlType::Boolean,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_mixes_with_arithmetic() {
        assert!(BinaryOp::Concat.mixes_with(BinaryOp::Add));
        assert!(BinaryOp::Mul.mixes_with(BinaryOp::Concat));
        assert!(!BinaryOp::Concat.mixes_with(BinaryOp::Concat));
        assert!(!BinaryOp::Add.mixes_with(BinaryOp::Sub));
        assert!(!BinaryOp::Eq.mixes_with(BinaryOp::Concat));
    }

    #[test]
    fn test_comparison_normalizes_to_left_type() {
        let expr = val_as(1.5, SqlType::Float).gt(2);
        let ExprKind::Binary { right, op, .. } = expr.kind() else {
            panic!("expected binary node");
        };
        assert_eq!(*op, BinaryOp::Gt);
        assert_eq!(right.sql_type(), &SqlType::Float);
        assert!(matches!(right.kind(), ExprKind::Value { value: SqlValue::Int(2), inline: false }));
        assert_eq!(expr.sql_type(), &SqlType::Boolean);
    }

    #[test]
    fn test_empty_in_list_is_representable() {
        let expr = val(1).is_in(Vec::<i64>::new());
        assert!(matches!(expr.kind(), ExprKind::InList { list, negated: false, .. } if list.is_empty()));
        assert_eq!(expr.precedence(), 0);
    }

    #[test]
    fn test_precedence_ordering() {
        let a = val(1);
        let mul = a.clone().mul(2);
        let add = a.clone().add(2);
        let cmp = a.clone().eq(2);
        let not = a.clone().eq(2).not();
        let and = cmp.clone().and(cmp.clone());
        let or = cmp.clone().or(cmp.clone());
        assert!(a.precedence() < mul.precedence());
        assert!(mul.precedence() < add.precedence());
        assert!(add.precedence() < cmp.precedence());
        assert!(cmp.precedence() < not.precedence());
        assert!(not.precedence() < and.precedence());
        assert!(and.precedence() < or.precedence());
    }

    #[test]
    fn test_inline_flag() {
        let expr = inline("O'Brien");
        assert!(matches!(expr.kind(), ExprKind::Value { inline: true, .. }));
        assert_eq!(expr.sql_type(), &SqlType::Text);
    }

    #[test]
    fn test_aggregate_types() {
        let n = val_as(1, SqlType::Integer);
        assert_eq!(n.clone().count().sql_type(), &SqlType::Integer);
        assert_eq!(n.clone().sum().sql_type(), &SqlType::Integer.nullable());
        assert_eq!(n.clone().avg().sql_type(), &SqlType::Float.nullable());
        assert_eq!(count_all().sql_type(), &SqlType::Integer);
    }

    #[test]
    fn test_named_expression() {
        let named = val(1).add(1).as_("two");
        assert_eq!(named.name(), "two");
        assert_eq!(named.sql_type(), &SqlType::Integer);
    }

    #[test]
    fn test_cast_retypes() {
        let expr = val("12").cast(SqlType::Integer);
        assert_eq!(expr.sql_type(), &SqlType::Integer);
        assert!(matches!(expr.kind(), ExprKind::Cast(inner) if inner.sql_type() == &SqlType::Text));
    }

    #[test]
    fn test_coalesce_takes_fallback_type() {
        let expr = val_as(SqlValue::Null, SqlType::Text.nullable()).coalesce("n/a");
        assert_eq!(expr.sql_type(), &SqlType::Text);
    }
}
