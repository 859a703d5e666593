//! Column and expression types.
//!
//! A [`SqlType`] knows how to move a value between its host-side form and
//! the primitive that is bound to a statement. It holds no query state.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::builder::value::SqlValue;
use crate::error::{Error, Result};

/// The serialization contract of an expression or column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// `BOOLEAN`.
    Boolean,
    /// 64-bit integer.
    Integer,
    /// Double precision float.
    Float,
    /// Character data.
    Text,
    /// Binary data.
    Blob,
    /// JSON document, bound as text.
    Json,
    /// UTC timestamp, bound as RFC 3339 text.
    Timestamp,
    /// Wraps another type and lets `NULL` through unchanged.
    Nullable(Box<SqlType>),
}

impl SqlType {
    /// Wraps the type so that it accepts `NULL`. Idempotent.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Returns true if the type accepts `NULL`.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Returns the type with any nullable wrapper removed.
    #[must_use]
    pub fn base(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner.base(),
            other => other,
        }
    }

    /// Returns true if the base type is `Boolean`.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self.base(), Self::Boolean)
    }

    /// Converts a host value into the wire primitive bound to a statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] when the value does not fit the type.
    pub fn serialize(&self, value: &SqlValue) -> Result<SqlValue> {
        match (self, value) {
            (Self::Nullable(_), SqlValue::Null) => Ok(SqlValue::Null),
            (Self::Nullable(inner), other) => inner.serialize(other),
            (_, SqlValue::Null) => Err(Error::Type(format!(
                "null is not a valid {self} value; use a nullable type"
            ))),
            (Self::Boolean, SqlValue::Bool(b)) => Ok(SqlValue::Bool(*b)),
            (Self::Integer, SqlValue::Int(n)) => Ok(SqlValue::Int(*n)),
            (Self::Float, SqlValue::Float(x)) => Ok(SqlValue::Float(*x)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float, SqlValue::Int(n)) => Ok(SqlValue::Float(*n as f64)),
            (Self::Text, SqlValue::Text(s)) => Ok(SqlValue::Text(s.clone())),
            (Self::Blob, SqlValue::Blob(b)) => Ok(SqlValue::Blob(b.clone())),
            (Self::Json, SqlValue::Json(v)) => Ok(SqlValue::Text(serde_json::to_string(v)?)),
            (Self::Json, SqlValue::Text(s)) => {
                // Already-encoded documents are checked, not re-encoded.
                serde_json::from_str::<serde_json::Value>(s)?;
                Ok(SqlValue::Text(s.clone()))
            }
            (Self::Timestamp, SqlValue::Timestamp(ts)) => Ok(SqlValue::Text(ts.to_rfc3339())),
            (Self::Timestamp, SqlValue::Text(s)) => {
                parse_timestamp(s)?;
                Ok(SqlValue::Text(s.clone()))
            }
            (ty, other) => Err(Error::Type(format!(
                "cannot serialize a {} value as {ty}",
                other.kind()
            ))),
        }
    }

    /// Converts a wire primitive read back from a database into the host value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] when the primitive cannot represent the type.
    pub fn deserialize(&self, value: SqlValue) -> Result<SqlValue> {
        match (self, value) {
            (Self::Nullable(_), SqlValue::Null) => Ok(SqlValue::Null),
            (Self::Nullable(inner), other) => inner.deserialize(other),
            (ty, SqlValue::Null) => Err(Error::Type(format!(
                "unexpected null for non-nullable {ty}"
            ))),
            (Self::Boolean, SqlValue::Bool(b)) => Ok(SqlValue::Bool(b)),
            // SQLite and MySQL hand booleans back as 0/1.
            (Self::Boolean, SqlValue::Int(n)) => Ok(SqlValue::Bool(n != 0)),
            (Self::Integer, SqlValue::Int(n)) => Ok(SqlValue::Int(n)),
            (Self::Float, SqlValue::Float(x)) => Ok(SqlValue::Float(x)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float, SqlValue::Int(n)) => Ok(SqlValue::Float(n as f64)),
            (Self::Text, SqlValue::Text(s)) => Ok(SqlValue::Text(s)),
            (Self::Blob, SqlValue::Blob(b)) => Ok(SqlValue::Blob(b)),
            (Self::Json, SqlValue::Text(s)) => Ok(SqlValue::Json(serde_json::from_str(&s)?)),
            (Self::Json, SqlValue::Json(v)) => Ok(SqlValue::Json(v)),
            (Self::Timestamp, SqlValue::Text(s)) => Ok(SqlValue::Timestamp(parse_timestamp(&s)?)),
            (Self::Timestamp, SqlValue::Timestamp(ts)) => Ok(SqlValue::Timestamp(ts)),
            (ty, other) => Err(Error::Type(format!(
                "cannot deserialize a {} value as {ty}",
                other.kind()
            ))),
        }
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Type(format!("invalid timestamp {s:?}: {e}")))
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Blob => f.write_str("blob"),
            Self::Json => f.write_str("json"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Nullable(inner) => write!(f, "nullable {inner}"),
        }
    }
}
