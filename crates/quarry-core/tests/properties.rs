//! Whole-compiler properties: parameter ordering, idempotence, name
//! disambiguation and expression reuse.

mod common;

use common::*;
use quarry_core::builder::{exists, inline, val, Select, SqlValue};
use quarry_core::dialect::PostgresDialect;
use quarry_core::{Compiler, Cte, Insert, SqlType, Table, Update};

// =============================================================================
// Reference examples
// =============================================================================

#[test]
fn test_select_without_columns() {
    let t = Table::builder("contacts")
        .required("firstname", SqlType::Text)
        .required("lastname", SqlType::Text)
        .build();
    let compiled = assert_pg(&Select::from(&t), "SELECT FROM contacts");
    assert!(compiled.parameters.is_empty());
}

#[test]
fn test_parameterized_predicate() {
    let query = Select::from(&contacts())
        .where_eq([("firstname", "Ann")])
        .unwrap();
    let compiled = assert_pg(&query, "SELECT FROM contacts WHERE firstname = $1");
    assert_eq!(compiled.parameters, [SqlValue::from("Ann")]);
}

#[test]
fn test_empty_in_is_false() {
    let query = Select::new()
        .select(val(1).is_in(Vec::<i64>::new()).as_("hit"))
        .unwrap();
    let compiled = assert_pg(&query, "SELECT false AS hit");
    assert!(compiled.parameters.is_empty());
}

#[test]
fn test_inline_literal_is_escaped() {
    let query = Select::new().select(inline("O'Brien").as_("surname")).unwrap();
    let compiled = assert_pg(&query, "SELECT 'O''Brien' AS surname");
    assert!(compiled.parameters.is_empty());
}

// =============================================================================
// Parameter order
// =============================================================================

#[test]
fn test_placeholders_are_numbered_in_text_order() {
    let c = contacts();
    let young = Cte::new(
        "young",
        Select::from(&c)
            .columns(&["firstname", "age"])
            .unwrap()
            .where_clause(c.col("age").unwrap().lt(30))
            .unwrap(),
    );
    let twin = c.aliased("twin");
    let query = Select::from(&young)
        .with(young.clone())
        .select(young.col("age").unwrap().add(5).as_("later"))
        .unwrap()
        .where_clause(exists(
            Select::from(&twin)
                .where_clause(
                    twin.col("firstname")
                        .unwrap()
                        .eq(young.col("firstname").unwrap()),
                )
                .unwrap()
                .where_eq([("lastname", "Lee")])
                .unwrap(),
        ))
        .unwrap()
        .where_clause(young.col("firstname").unwrap().is_in(["Ann", "Bo"]))
        .unwrap()
        .limit(3);
    let compiled = pg(&query);
    let indices = placeholder_indices(&compiled.sql);
    assert_eq!(indices, (1..=compiled.parameters.len()).collect::<Vec<_>>());
    assert_eq!(
        compiled.parameters,
        [
            SqlValue::Int(30),
            SqlValue::Int(5),
            SqlValue::from("Lee"),
            SqlValue::from("Ann"),
            SqlValue::from("Bo"),
            SqlValue::Int(3),
        ]
    );
}

#[test]
fn test_update_parameters_follow_text_order() {
    let c = contacts();
    let update = Update::table(&c)
        .where_eq([("lastname", "Lee")])
        .unwrap()
        .set("email", "lee@example.com")
        .unwrap()
        .set("age", c.col("age").unwrap().add(1))
        .unwrap();
    let compiled = assert_pg(
        &update,
        "UPDATE contacts SET email = $1, age = age + $2 WHERE lastname = $3",
    );
    assert_eq!(compiled.parameters[2], SqlValue::from("Lee"));
}

// =============================================================================
// Idempotence and reuse
// =============================================================================

#[test]
fn test_compiling_twice_gives_identical_output() {
    let insert = Insert::into(&contacts())
        .values([("firstname", "Ann"), ("lastname", "Lee")])
        .unwrap();
    let compiler = Compiler::new(&PostgresDialect);
    let first = compiler.compile(&insert).unwrap();
    let second = compiler.compile(&insert).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_expression_reused_in_two_statements() {
    let c = contacts();
    let adult = c.col("age").unwrap().gt_eq(18);
    let listing = Select::from(&c)
        .columns(&["firstname"])
        .unwrap()
        .where_clause(adult.clone())
        .unwrap();
    let purge = quarry_core::Delete::from(&c).where_clause(adult).unwrap();
    assert_pg(&listing, "SELECT firstname FROM contacts WHERE age >= $1");
    assert_pg(&purge, "DELETE FROM contacts WHERE age >= $1");
}

#[test]
fn test_expression_reused_twice_in_one_statement() {
    let c = contacts();
    let age = c.col("age").unwrap().mul(2);
    let query = Select::from(&c)
        .select(age.clone().as_("doubled"))
        .unwrap()
        .where_clause(age.gt(10))
        .unwrap();
    let compiled = assert_pg(
        &query,
        "SELECT age * $1 AS doubled FROM contacts WHERE age * $2 > $3",
    );
    assert_eq!(
        compiled.parameters,
        [SqlValue::Int(2), SqlValue::Int(2), SqlValue::Int(10)]
    );
}

// =============================================================================
// Disambiguation
// =============================================================================

#[test]
fn test_only_colliding_names_are_qualified() {
    let p = people();
    let ph = phones();
    let query = Select::from(&p)
        .inner_join(&ph, ph.col("person_id").unwrap().eq(p.col("id").unwrap()))
        .unwrap()
        .select(p.col("name").unwrap().as_("name"))
        .unwrap()
        .select(ph.col("number").unwrap().as_("number"))
        .unwrap()
        .select(ph.col("id").unwrap().as_("phone_id"))
        .unwrap();
    let sql = pg(&query).sql;
    assert!(sql.starts_with("SELECT name, number, phones.id AS phone_id FROM"));
    assert!(sql.ends_with("ON person_id = people.id"));
}

#[test]
fn test_aliases_are_distinct_sources() {
    let c = contacts();
    let a = c.aliased("a");
    let b = c.aliased("b");
    let query = Select::from(&a)
        .cross_join(&b)
        .unwrap()
        .where_clause(a.col("age").unwrap().lt(b.col("age").unwrap()))
        .unwrap();
    assert_pg(
        &query,
        "SELECT FROM contacts AS a CROSS JOIN contacts AS b WHERE a.age < b.age",
    );
}
