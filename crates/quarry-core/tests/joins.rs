//! Join compilation tests.

mod common;

use common::*;
use quarry_core::builder::{Order, Select};
use quarry_core::{Error, FromItem, JoinKind};

#[test]
fn test_self_join_qualifies_shared_names() {
    let c = contacts();
    let alias = c.aliased("c");
    let query = Select::from(&c)
        .inner_join(
            &alias,
            c.col("firstname")
                .unwrap()
                .eq(alias.col("firstname").unwrap()),
        )
        .unwrap();
    let compiled = assert_pg(
        &query,
        "SELECT FROM contacts JOIN contacts AS c ON contacts.firstname = c.firstname",
    );
    assert!(compiled.parameters.is_empty());
}

#[test]
fn test_left_join_shortens_unique_names() {
    let p = people();
    let ph = phones();
    let query = Select::from(&p)
        .left_join(
            &ph,
            ph.col("person_id").unwrap().eq(p.col("id").unwrap()),
        )
        .unwrap()
        .columns(&["number"])
        .unwrap();
    assert_pg(
        &query,
        "SELECT number FROM people LEFT JOIN phones ON person_id = people.id",
    );
}

#[test]
fn test_joined_columns_with_same_name() {
    let p = people();
    let ph = phones();
    let query = Select::from(&p)
        .inner_join(
            &ph,
            ph.col("person_id").unwrap().eq(p.col("id").unwrap()),
        )
        .unwrap()
        .select(p.col("id").unwrap().as_("person"))
        .unwrap()
        .select(ph.col("id").unwrap().as_("phone"))
        .unwrap()
        .select(p.all())
        .unwrap()
        .order_by(p.col("name").unwrap(), Order::Asc);
    assert_pg(
        &query,
        "SELECT people.id AS person, phones.id AS phone, people.id, name \
         FROM people JOIN phones ON person_id = people.id ORDER BY name",
    );
}

#[test]
fn test_cross_and_full_joins() {
    let c = contacts();
    let p = people();
    let query = Select::from(&c).cross_join(&p).unwrap();
    assert_pg(&query, "SELECT FROM contacts CROSS JOIN people");

    let query = Select::from(&c)
        .full_join(
            &p,
            p.col("name").unwrap().eq(c.col("firstname").unwrap()),
        )
        .unwrap();
    assert_pg(
        &query,
        "SELECT FROM contacts FULL JOIN people ON name = firstname",
    );
}

#[test]
fn test_join_chain_tracks_latest_table() {
    let c = contacts();
    let p = people();
    let ph = phones();
    let query = Select::from(&p)
        .inner_join(
            &ph,
            ph.col("person_id").unwrap().eq(p.col("id").unwrap()),
        )
        .unwrap()
        .left_join(
            &c,
            c.col("firstname").unwrap().eq(p.col("name").unwrap()),
        )
        .unwrap()
        .columns(&["lastname", "email"])
        .unwrap()
        .where_eq([("age", 30)])
        .unwrap();
    let compiled = assert_pg(
        &query,
        "SELECT lastname, email FROM people JOIN phones ON person_id = people.id \
         LEFT JOIN contacts ON firstname = name WHERE age = $1",
    );
    assert_eq!(compiled.parameters.len(), 1);
}

#[test]
fn test_join_onto_a_join_is_parenthesized() {
    let c = contacts();
    let p = people();
    let ph = phones();
    let right = FromItem::from(&ph)
        .inner_join(
            &c,
            c.col("firstname").unwrap().eq(ph.col("number").unwrap()),
        )
        .unwrap();
    let query = Select::from(&p)
        .left_join(
            right,
            ph.col("person_id").unwrap().eq(p.col("id").unwrap()),
        )
        .unwrap()
        .columns(&["lastname"])
        .unwrap();
    assert_pg(
        &query,
        "SELECT lastname FROM people LEFT JOIN (phones JOIN contacts ON firstname = number) \
         ON person_id = people.id",
    );
}

#[test]
fn test_join_derived_table() {
    let c = contacts();
    let p = people();
    let counts = Select::from(&c)
        .columns(&["firstname"])
        .unwrap()
        .select(quarry_core::builder::count_all().as_("n"))
        .unwrap()
        .group_by_column("firstname")
        .unwrap()
        .alias("counts");
    let query = Select::from(&p)
        .inner_join(
            &counts,
            counts.col("firstname").unwrap().eq(p.col("name").unwrap()),
        )
        .unwrap()
        .columns(&["n"])
        .unwrap();
    assert_pg(
        &query,
        "SELECT n FROM people JOIN (SELECT firstname, count(*) AS n FROM contacts \
         GROUP BY firstname) AS counts ON firstname = name",
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_join_without_primary_table() {
    let p = people();
    let err = Select::new().cross_join(&p).unwrap_err();
    assert!(matches!(err, Error::NoPrimaryTable));
}

#[test]
fn test_join_condition_rules() {
    let c = contacts();
    let p = people();
    let on = p.col("name").unwrap().eq(c.col("firstname").unwrap());

    let err = Select::from(&c)
        .join(&p, JoinKind::Inner, None)
        .unwrap_err();
    assert_eq!(err.to_string(), "INNER JOIN requires a join condition");

    let err = Select::from(&c)
        .join(&p, JoinKind::Cross, Some(on))
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedJoinCondition));

    let err = Select::from(&c)
        .left_join(&p, p.col("name").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NotBoolean {
            context: "join condition",
            ..
        }
    ));
}

#[test]
fn test_bare_name_after_join_resolves_against_joined_table() {
    let c = contacts();
    let p = people();
    let err = Select::from(&c)
        .cross_join(&p)
        .unwrap()
        .columns(&["lastname"])
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown column 'lastname' on 'people'");
}
