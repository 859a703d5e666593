//! SQL values and parameter handling.
//!
//! [`SqlValue`] is both the host-side value handed to the builder and the
//! wire primitive produced by [`SqlType::serialize`](crate::types::SqlType::serialize).
//! Only `Json` and `Timestamp` are host-only; the wire side never carries them.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::builder::expr::Expr;
use crate::types::SqlType;

/// A SQL value that can be bound as a parameter or rendered inline.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// JSON document. Serialized to text on the wire.
    Json(serde_json::Value),
    /// UTC timestamp. Serialized to RFC 3339 text on the wire.
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Returns true for `SqlValue::Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type a value carries when nothing else is known about it.
    ///
    /// `NULL` infers a nullable text type.
    #[must_use]
    pub fn inferred_type(&self) -> SqlType {
        match self {
            Self::Null => SqlType::Text.nullable(),
            Self::Bool(_) => SqlType::Boolean,
            Self::Int(_) => SqlType::Integer,
            Self::Float(_) => SqlType::Float,
            Self::Text(_) => SqlType::Text,
            Self::Blob(_) => SqlType::Blob,
            Self::Json(_) => SqlType::Json,
            Self::Timestamp(_) => SqlType::Timestamp,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Json(_) => "json",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Self::Json(v) => write!(f, "{v}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

impl_to_sql_int!(i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Json(self)
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

macro_rules! impl_from_for_sql_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    value.to_sql_value()
                }
            }
        )*
    };
}

impl_from_for_sql_value!(
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    Vec<u8>,
    serde_json::Value,
    DateTime<Utc>
);

/// Anything usable as the right-hand side of an operator.
///
/// Plain values are normalized into a bound `Value` node typed after the
/// left operand; expressions are used as they are.
pub trait IntoOperand {
    /// Converts into an expression, using `ty` for plain values.
    fn into_operand(self, ty: &SqlType) -> Expr;
}

impl IntoOperand for Expr {
    fn into_operand(self, _ty: &SqlType) -> Expr {
        self
    }
}

impl IntoOperand for &Expr {
    fn into_operand(self, _ty: &SqlType) -> Expr {
        self.clone()
    }
}

macro_rules! impl_into_operand {
    ($($ty:ty),*) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self, ty: &SqlType) -> Expr {
                    Expr::value_of(self.to_sql_value(), ty.clone(), false)
                }
            }
        )*
    };
}

impl_into_operand!(
    SqlValue,
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8],
    serde_json::Value,
    DateTime<Utc>
);

impl<T: ToSqlValue> IntoOperand for Option<T> {
    fn into_operand(self, ty: &SqlType) -> Expr {
        Expr::value_of(self.to_sql_value(), ty.clone(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_inferred_types() {
        assert_eq!(SqlValue::Int(1).inferred_type(), SqlType::Integer);
        assert_eq!(SqlValue::Null.inferred_type(), SqlType::Text.nullable());
        assert_eq!(
            serde_json::json!({"a": 1}).to_sql_value().inferred_type(),
            SqlType::Json
        );
    }

    #[test]
    fn test_operand_normalization_uses_left_type() {
        let expr = 7_i32.into_operand(&SqlType::Float);
        assert_eq!(expr.sql_type(), &SqlType::Float);
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Text(String::from("a")).to_string(), "\"a\"");
        assert_eq!(SqlValue::Blob(vec![1, 2]).to_string(), "<2 bytes>");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
    }
}
