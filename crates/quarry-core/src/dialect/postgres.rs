//! PostgreSQL dialect.

use std::sync::LazyLock;

use super::{Dialect, ReservedWords, POSTGRES_RESERVED};
use crate::types::SqlType;

static RESERVED: LazyLock<ReservedWords> = LazyLock::new(|| ReservedWords::new(POSTGRES_RESERVED));

/// PostgreSQL dialect: `$n` placeholders and `E'...'` literals for
/// strings containing backslashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn reserved_words(&self) -> &ReservedWords {
        &RESERVED
    }

    fn escape_string_literal(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        let mut has_backslash = false;
        escaped.push('\'');
        for c in value.chars() {
            match c {
                '\'' => escaped.push_str("''"),
                '\\' => {
                    escaped.push_str("\\\\");
                    has_backslash = true;
                }
                other => escaped.push(other),
            }
        }
        escaped.push('\'');
        if has_backslash {
            escaped.insert(0, 'E');
        }
        escaped
    }

    fn parameter_placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn blob_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
        format!("'\\x{hex}'::bytea")
    }

    fn type_name(&self, ty: &SqlType) -> &'static str {
        match ty.base() {
            SqlType::Blob => "BYTEA",
            SqlType::Json => "JSONB",
            SqlType::Timestamp => "TIMESTAMPTZ",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "BIGINT",
            SqlType::Float => "DOUBLE PRECISION",
            SqlType::Text | SqlType::Nullable(_) => "TEXT",
        }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_delete_using(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_placeholders() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.parameter_placeholder(1), "$1");
        assert_eq!(dialect.parameter_placeholder(12), "$12");
    }

    #[test]
    fn test_escape_without_backslash() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.escape_string_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_escape_with_backslash_uses_e_prefix() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.escape_string_literal(r"C:\temp"), r"E'C:\\temp'");
        assert_eq!(dialect.escape_string_literal(r"it's \ ok"), r"E'it''s \\ ok'");
    }

    #[test]
    fn test_postgres_reserved_words() {
        let dialect = PostgresDialect::new();
        assert!(dialect.needs_quoting("user"));
        assert!(dialect.needs_quoting("returning"));
        assert!(!dialect.needs_quoting("firstname"));
        assert!(dialect.supports_returning());
        assert!(dialect.supports_delete_using());
    }

    #[test]
    fn test_postgres_blob_literal() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.blob_literal(&[0xde, 0xad]), r"'\xdead'::bytea");
    }
}
