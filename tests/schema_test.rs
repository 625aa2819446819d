//! Schema registration and template derivation tests.
//!
//! These run without a database: registration is a pure build step over the
//! declared field descriptors.

use miniorm::{Field, Model, OrmError, Schema, model};

model! {
    struct User ("users") {
        id => Field::string().primary_key(),
        name => Field::string(),
        email => Field::string(),
        admin => Field::boolean(),
    }
}

#[test]
fn select_template_lists_pk_first() {
    assert_eq!(
        User::schema().select_sql(),
        "select `id`, `name`, `email`, `admin` from `users`"
    );
}

#[test]
fn insert_template_appends_pk_last() {
    assert_eq!(
        User::schema().insert_sql(),
        "insert into `users` (`name`, `email`, `admin`, `id`) values (?, ?, ?, ?)"
    );
}

#[test]
fn update_and_delete_key_on_pk() {
    assert_eq!(
        User::schema().update_sql(),
        "update `users` set `name`=?, `email`=?, `admin`=? where `id`=?"
    );
    assert_eq!(User::schema().delete_sql(), "delete from `users` where `id`=?");
}

#[test]
fn placeholder_counts_follow_field_count() {
    // N non-key fields: insert and update carry N+1 placeholders,
    // delete exactly 1.
    for n in 1..6 {
        let mut declared = vec![("id", Field::integer().primary_key())];
        let names: Vec<String> = (0..n).map(|i| format!("f{}", i)).collect();
        for name in &names {
            declared.push((name.as_str(), Field::string()));
        }
        let schema = Schema::build("Probe", "probe", declared).unwrap();
        assert_eq!(schema.insert_sql().matches('?').count(), n + 1);
        assert_eq!(schema.update_sql().matches('?').count(), n + 1);
        assert_eq!(schema.delete_sql().matches('?').count(), 1);
        assert_eq!(schema.select_sql().matches('?').count(), 0);
    }
}

#[test]
fn zero_primary_keys_is_a_definition_error() {
    let err = Schema::build(
        "Tag",
        "tags",
        vec![("name", Field::string()), ("slug", Field::string())],
    )
    .unwrap_err();
    assert!(matches!(err, OrmError::Definition { .. }));
    assert!(err.to_string().contains("primary key not found"));
}

#[test]
fn two_primary_keys_is_a_definition_error() {
    let err = Schema::build(
        "Tag",
        "tags",
        vec![
            ("id", Field::integer().primary_key()),
            ("slug", Field::string().primary_key()),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, OrmError::Definition { .. }));
    assert!(err.to_string().contains("duplicate primary key"));
}

#[test]
fn explicit_column_names_flow_into_all_templates() {
    let schema = Schema::build(
        "Comment",
        "comments",
        vec![
            ("id", Field::string().primary_key()),
            ("blog", Field::string().column("blog_id")),
            ("content", Field::text()),
        ],
    )
    .unwrap();
    assert_eq!(
        schema.select_sql(),
        "select `id`, `blog_id`, `content` from `comments`"
    );
    assert_eq!(
        schema.insert_sql(),
        "insert into `comments` (`blog_id`, `content`, `id`) values (?, ?, ?)"
    );
    assert_eq!(
        schema.update_sql(),
        "update `comments` set `blog_id`=?, `content`=? where `id`=?"
    );
}

#[test]
fn registration_consumes_descriptors_into_the_schema() {
    // Only the derived schema information is retained on the type; the
    // descriptor metadata is reachable through the schema alone.
    let schema = User::schema();
    let field = schema.field("admin").unwrap();
    assert_eq!(field.column_type, "boolean");
    assert!(!field.primary_key);
    assert!(schema.field("no_such_attr").is_none());
}

#[test]
fn ordered_fields_exclude_the_primary_key() {
    assert_eq!(User::schema().fields(), &["name", "email", "admin"]);
    assert_eq!(User::schema().primary_key(), "id");
}
