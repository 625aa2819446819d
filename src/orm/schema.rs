//! Schema registration and SQL template derivation.
//!
//! [`Schema::build`] runs exactly once per entity type, at the point the
//! type is declared (the `model!` macro registers it behind a `LazyLock`).
//! It scans the declared field descriptors in order, records the primary
//! key and the non-key field list, and derives the four canonical SQL
//! templates with backtick-quoted identifiers and `?` value placeholders.
//! The descriptors are consumed by registration; afterwards only the
//! derived schema is retained.

use crate::error::{OrmError, OrmResult};
use crate::orm::field::Field;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Wrap an identifier in backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name)
}

/// Build a comma-joined value placeholder list, e.g. `?, ?, ?`.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Immutable mapping information derived from an entity declaration.
#[derive(Debug, Clone)]
pub struct Schema {
    model: String,
    table: String,
    primary_key: String,
    /// Non-primary-key attribute names, in declaration order.
    fields: Vec<String>,
    mappings: HashMap<String, Field>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl Schema {
    /// Scan the declared attribute descriptors and derive the schema.
    ///
    /// Fails with a definition error when no primary key is declared, when
    /// two fields claim the primary key, or when two attributes collide on
    /// the same attribute or column name.
    pub fn build(model: &str, table: &str, declared: Vec<(&str, Field)>) -> OrmResult<Schema> {
        debug!(model = %model, table = %table, "found model");

        let mut mappings: HashMap<String, Field> = HashMap::new();
        let mut fields: Vec<String> = Vec::new();
        let mut columns_seen: HashSet<String> = HashSet::new();
        let mut primary_key: Option<String> = None;

        for (attr, field) in declared {
            debug!(attr = %attr, field = %field, "found mapping");
            if mappings.contains_key(attr) {
                return Err(OrmError::definition(
                    model,
                    format!("duplicate field: {}", attr),
                ));
            }
            let column = field.name.clone().unwrap_or_else(|| attr.to_string());
            if !columns_seen.insert(column) {
                return Err(OrmError::definition(
                    model,
                    format!("duplicate column name for field: {}", attr),
                ));
            }
            if field.primary_key {
                if primary_key.is_some() {
                    return Err(OrmError::definition(
                        model,
                        format!("duplicate primary key for field: {}", attr),
                    ));
                }
                primary_key = Some(attr.to_string());
            } else {
                fields.push(attr.to_string());
            }
            mappings.insert(attr.to_string(), field);
        }

        let primary_key =
            primary_key.ok_or_else(|| OrmError::definition(model, "primary key not found"))?;

        let column_of = |attr: &String| -> String {
            let field = &mappings[attr];
            field.name.clone().unwrap_or_else(|| attr.clone())
        };

        let escaped_pk = quote_ident(&column_of(&primary_key));
        let escaped_table = quote_ident(table);
        let escaped_fields: Vec<String> = fields
            .iter()
            .map(|attr| quote_ident(&column_of(attr)))
            .collect();

        let select_sql = if escaped_fields.is_empty() {
            format!("select {} from {}", escaped_pk, escaped_table)
        } else {
            format!(
                "select {}, {} from {}",
                escaped_pk,
                escaped_fields.join(", "),
                escaped_table
            )
        };
        let insert_sql = if escaped_fields.is_empty() {
            format!(
                "insert into {} ({}) values ({})",
                escaped_table,
                escaped_pk,
                placeholders(1)
            )
        } else {
            format!(
                "insert into {} ({}, {}) values ({})",
                escaped_table,
                escaped_fields.join(", "),
                escaped_pk,
                placeholders(escaped_fields.len() + 1)
            )
        };
        let update_sql = format!(
            "update {} set {} where {}=?",
            escaped_table,
            escaped_fields
                .iter()
                .map(|col| format!("{}=?", col))
                .collect::<Vec<_>>()
                .join(", "),
            escaped_pk
        );
        let delete_sql = format!("delete from {} where {}=?", escaped_table, escaped_pk);

        Ok(Schema {
            model: model.to_string(),
            table: table.to_string(),
            primary_key,
            fields,
            mappings,
            select_sql,
            insert_sql,
            update_sql,
            delete_sql,
        })
    }

    /// Name of the entity type this schema was derived from.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attribute name of the primary key.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Non-primary-key attribute names, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Look up the descriptor for a mapped attribute.
    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.mappings.get(attr)
    }

    /// Resolve the column name for a mapped attribute.
    pub fn column_of<'a>(&'a self, attr: &'a str) -> &'a str {
        self.mappings
            .get(attr)
            .and_then(|f| f.name.as_deref())
            .unwrap_or(attr)
    }

    /// All mapped attribute names: the primary key followed by the
    /// non-key fields in declaration order.
    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_key.as_str()).chain(self.fields.iter().map(String::as_str))
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}
