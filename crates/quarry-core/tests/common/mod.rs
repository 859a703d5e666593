#![allow(dead_code)]

use quarry_core::dialect::{GenericDialect, PostgresDialect};
use quarry_core::{CompiledQuery, Compiler, Error, SqlType, Statement, Table};

/// Compiles for PostgreSQL, panicking on failure.
pub fn pg<'a>(statement: impl Into<Statement<'a>>) -> CompiledQuery {
    Compiler::new(&PostgresDialect)
        .compile(statement)
        .unwrap_or_else(|e| panic!("Failed to compile: {e}"))
}

/// Compiles for PostgreSQL and returns the error.
pub fn pg_err<'a>(statement: impl Into<Statement<'a>>) -> Error {
    match Compiler::new(&PostgresDialect).compile(statement) {
        Ok(compiled) => panic!("Expected a compile error, got: {}", compiled.sql),
        Err(e) => e,
    }
}

/// Compiles with the generic dialect, panicking on failure.
pub fn generic<'a>(statement: impl Into<Statement<'a>>) -> CompiledQuery {
    Compiler::new(&GenericDialect::new())
        .compile(statement)
        .unwrap_or_else(|e| panic!("Failed to compile: {e}"))
}

/// Asserts the PostgreSQL rendering of a statement.
pub fn assert_pg<'a>(statement: impl Into<Statement<'a>>, sql: &str) -> CompiledQuery {
    let compiled = pg(statement);
    assert_eq!(compiled.sql, sql);
    compiled
}

/// `contacts(firstname, lastname, age?, email?)`.
pub fn contacts() -> Table {
    Table::builder("contacts")
        .required("firstname", SqlType::Text)
        .required("lastname", SqlType::Text)
        .optional("age", SqlType::Integer.nullable())
        .optional("email", SqlType::Text.nullable())
        .build()
}

/// `people(id, name)`.
pub fn people() -> Table {
    Table::builder("people")
        .optional("id", SqlType::Integer)
        .required("name", SqlType::Text)
        .build()
}

/// `phones(id, person_id, number)`.
pub fn phones() -> Table {
    Table::builder("phones")
        .optional("id", SqlType::Integer)
        .required("person_id", SqlType::Integer)
        .required("number", SqlType::Text)
        .build()
}

/// Returns the `$n` indices in the order they appear in `sql`.
pub fn placeholder_indices(sql: &str) -> Vec<usize> {
    let mut out = vec![];
    let mut rest = sql;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse() {
            out.push(n);
        }
    }
    out
}
