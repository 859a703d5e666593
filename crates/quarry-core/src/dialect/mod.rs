//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. This module provides
//! a trait for dialect-specific behavior: identifier quoting, string literal
//! escaping, placeholder syntax and type names.

mod generic;
mod postgres;
mod reserved;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use reserved::{ReservedWords, ANSI_RESERVED, POSTGRES_RESERVED};

use std::sync::LazyLock;

use regex::Regex;

use crate::types::SqlType;

static SAFE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z_][a-z_0-9]*$").expect("Invalid identifier regex")
});

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the reserved word table used by [`Dialect::needs_quoting`].
    fn reserved_words(&self) -> &ReservedWords;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut doubled = String::with_capacity(2);
        doubled.push(quote);
        doubled.push(quote);
        let escaped = name.replace(quote, &doubled);
        format!("{quote}{escaped}{quote}")
    }

    /// Returns true if `word` is reserved (case-insensitive).
    fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words().contains(word)
    }

    /// Returns true unless the identifier is a plain word that is not reserved.
    fn needs_quoting(&self, identifier: &str) -> bool {
        !SAFE_IDENTIFIER.is_match(identifier) || self.is_reserved(identifier)
    }

    /// Renders a string literal, doubling embedded single quotes.
    fn escape_string_literal(&self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        format!("'{escaped}'")
    }

    /// Returns the placeholder for the 1-based parameter `index`.
    fn parameter_placeholder(&self, index: usize) -> String {
        let _ = index;
        String::from("?")
    }

    /// Returns the boolean keyword.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    /// Renders a blob literal.
    fn blob_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
        format!("X'{hex}'")
    }

    /// Returns the type name used in `CAST`.
    fn type_name(&self, ty: &SqlType) -> &'static str {
        match ty.base() {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "BIGINT",
            SqlType::Float => "DOUBLE PRECISION",
            SqlType::Blob => "BLOB",
            SqlType::Json => "JSON",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text | SqlType::Nullable(_) => "TEXT",
        }
    }

    /// Returns whether the dialect supports RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Returns whether DELETE accepts a USING clause.
    fn supports_delete_using(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier_pattern() {
        let dialect = GenericDialect::new();
        assert!(!dialect.needs_quoting("contacts"));
        assert!(!dialect.needs_quoting("first_name2"));
        assert!(!dialect.needs_quoting("FirstName"));
        assert!(dialect.needs_quoting("2fast"));
        assert!(dialect.needs_quoting("first name"));
        assert!(dialect.needs_quoting("été"));
    }

    #[test]
    fn test_reserved_words_need_quoting() {
        let dialect = GenericDialect::new();
        assert!(dialect.needs_quoting("select"));
        assert!(dialect.needs_quoting("Order"));
        assert!(!dialect.needs_quoting("orders"));
    }

    #[test]
    fn test_quote_identifier_doubles_quotes() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.quote_identifier("user"), "\"user\"");
        assert_eq!(dialect.quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_default_string_escaping() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.escape_string_literal("O'Brien"), "'O''Brien'");
        assert_eq!(dialect.escape_string_literal(r"a\b"), r"'a\b'");
    }
}
