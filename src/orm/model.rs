//! Entity base behavior and the `model!` declaration macro.
//!
//! [`Model`] is the runtime behavior shared by every mapped row type:
//! attribute storage, default-value resolution, and the CRUD methods that
//! bind to the SQL templates derived at declaration time. Implementors only
//! supply the schema and the attribute map; everything else is provided.

use crate::db::pool::Db;
use crate::db::row::RowMap;
use crate::error::{OrmError, OrmResult};
use crate::orm::schema::{Schema, quote_ident};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// Mutable, order-irrelevant attribute storage for one entity instance.
pub type AttrMap = serde_json::Map<String, JsonValue>;

/// Options for [`Model::find_all`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub where_clause: Option<String>,
    pub args: Vec<JsonValue>,
    pub order_by: Option<String>,
    /// Either an unsigned row count or a two-element `[offset, count]`
    /// array; any other shape is an invalid-argument error.
    pub limit: Option<JsonValue>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_clause(mut self, clause: &str) -> Self {
        self.where_clause = Some(clause.to_string());
        self
    }

    pub fn args(mut self, args: Vec<JsonValue>) -> Self {
        self.args = args;
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn limit(mut self, limit: impl Into<JsonValue>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

enum Limit {
    Count(u64),
    OffsetCount(u64, u64),
}

fn parse_limit(value: &JsonValue) -> OrmResult<Limit> {
    if let Some(count) = value.as_u64() {
        return Ok(Limit::Count(count));
    }
    if let Some(items) = value.as_array() {
        if let [offset, count] = items.as_slice() {
            if let (Some(offset), Some(count)) = (offset.as_u64(), count.as_u64()) {
                return Ok(Limit::OffsetCount(offset, count));
            }
        }
    }
    Err(OrmError::invalid_argument(format!(
        "invalid limit value: {}",
        value
    )))
}

/// Behavior shared by every mapped row type.
///
/// The four required items are generated by the [`model!`](crate::model)
/// macro; the CRUD methods are provided on top of them.
#[allow(async_fn_in_trait)]
pub trait Model: Sized {
    /// The schema derived once at declaration time.
    fn schema() -> &'static Schema;

    fn attrs(&self) -> &AttrMap;

    fn attrs_mut(&mut self) -> &mut AttrMap;

    fn from_attrs(attrs: AttrMap) -> Self;

    /// Create an empty instance, e.g. for a fresh insert.
    fn new() -> Self {
        Self::from_attrs(AttrMap::new())
    }

    /// Current value of an attribute, or null when unset. No default
    /// substitution happens here.
    fn get(&self, attr: &str) -> JsonValue {
        self.attrs().get(attr).cloned().unwrap_or(JsonValue::Null)
    }

    /// Value of an attribute, falling back to its declared default. A
    /// computed default is produced once and cached back onto the
    /// instance, so later reads observe the same value.
    fn get_or_default(&mut self, attr: &str) -> JsonValue {
        let current = self.get(attr);
        if !current.is_null() {
            return current;
        }
        let Some(field) = Self::schema().field(attr) else {
            return JsonValue::Null;
        };
        match field.resolve_default() {
            Some(value) => {
                debug!(attr = %attr, value = %value, "using default value");
                self.attrs_mut().insert(attr.to_string(), value.clone());
                value
            }
            None => JsonValue::Null,
        }
    }

    fn set(&mut self, attr: &str, value: impl Into<JsonValue>) {
        self.attrs_mut().insert(attr.to_string(), value.into());
    }

    /// Hydrate an instance from a result row keyed by column name.
    fn from_row(row: RowMap) -> Self {
        let schema = Self::schema();
        let mut attrs = AttrMap::new();
        for attr in schema.attr_names() {
            if let Some(value) = row.get(schema.column_of(attr)) {
                attrs.insert(attr.to_string(), value.clone());
            }
        }
        Self::from_attrs(attrs)
    }

    /// Find entities by where clause, with optional ordering and limit.
    async fn find_all(db: &Db, opts: FindOptions) -> OrmResult<Vec<Self>> {
        let schema = Self::schema();
        let mut sql = vec![schema.select_sql().to_string()];
        let mut args = opts.args;
        if let Some(clause) = &opts.where_clause {
            sql.push(format!("where {}", clause));
        }
        if let Some(clause) = &opts.order_by {
            sql.push(format!("order by {}", clause));
        }
        if let Some(limit) = &opts.limit {
            // validated before any statement is issued
            match parse_limit(limit)? {
                Limit::Count(count) => {
                    sql.push("limit ?".to_string());
                    args.push(count.into());
                }
                Limit::OffsetCount(offset, count) => {
                    sql.push("limit ?, ?".to_string());
                    args.push(offset.into());
                    args.push(count.into());
                }
            }
        }
        let rows = db.query(&sql.join(" "), &args, None).await?;
        Ok(rows.into_iter().map(Self::from_row).collect())
    }

    /// Evaluate a single aliased select expression, e.g. `count(*)`.
    /// Returns `None` when the query yields no rows.
    async fn find_number(
        db: &Db,
        select_expr: &str,
        where_clause: Option<&str>,
        args: &[JsonValue],
    ) -> OrmResult<Option<JsonValue>> {
        let schema = Self::schema();
        let mut sql = format!(
            "select {} as `_num_` from {}",
            select_expr,
            quote_ident(schema.table())
        );
        if let Some(clause) = where_clause {
            sql.push_str(" where ");
            sql.push_str(clause);
        }
        let mut rows = db.query(&sql, args, Some(1)).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows[0].remove("_num_").unwrap_or(JsonValue::Null)))
    }

    /// Find one entity by primary key.
    async fn find(db: &Db, pk: impl Into<JsonValue>) -> OrmResult<Option<Self>> {
        let schema = Self::schema();
        let sql = format!(
            "{} where {}=?",
            schema.select_sql(),
            quote_ident(schema.column_of(schema.primary_key()))
        );
        let mut rows = db.query(&sql, &[pk.into()], Some(1)).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::from_row(rows.remove(0))))
    }

    /// Insert this instance. Field values fall back to their declared
    /// defaults; a computed primary-key default is persisted back onto the
    /// instance so the caller can read the generated key afterwards.
    /// Returns the affected-row count, logging a warning when it is not 1.
    async fn save(&mut self, db: &Db) -> OrmResult<u64> {
        let schema = Self::schema();
        let mut args: Vec<JsonValue> = Vec::with_capacity(schema.fields().len() + 1);
        for attr in schema.fields() {
            args.push(self.get_or_default(attr));
        }
        let pk = self.get_or_default(schema.primary_key());
        if pk.is_null() {
            return Err(OrmError::invalid_argument(format!(
                "cannot save {}: primary key '{}' has no value and no default",
                schema.model(),
                schema.primary_key()
            )));
        }
        args.push(pk);
        let rows = db.execute(schema.insert_sql(), &args).await?;
        if rows != 1 {
            warn!(rows, "failed to insert record: affected rows");
        }
        Ok(rows)
    }

    /// Update the row matching this instance's primary key with the
    /// currently set attribute values (no default substitution).
    /// Returns the affected-row count, logging a warning when it is not 1.
    async fn update(&self, db: &Db) -> OrmResult<u64> {
        let schema = Self::schema();
        let mut args: Vec<JsonValue> = Vec::with_capacity(schema.fields().len() + 1);
        for attr in schema.fields() {
            args.push(self.get(attr));
        }
        args.push(self.get(schema.primary_key()));
        let rows = db.execute(schema.update_sql(), &args).await?;
        if rows != 1 {
            warn!(rows, "failed to update by primary key: affected rows");
        }
        Ok(rows)
    }

    /// Delete the row matching this instance's primary key.
    /// Returns the affected-row count, logging a warning when it is not 1.
    async fn remove(&self, db: &Db) -> OrmResult<u64> {
        let schema = Self::schema();
        let args = [self.get(schema.primary_key())];
        let rows = db.execute(schema.delete_sql(), &args).await?;
        if rows != 1 {
            warn!(rows, "failed to remove by primary key: affected rows");
        }
        Ok(rows)
    }
}

/// Declare a mapped row type and register its schema.
///
/// The schema is derived once, at first use, from the listed field
/// descriptors; an invalid declaration (no primary key, duplicate primary
/// key) aborts with the definition error. The table name defaults to the
/// type name and can be overridden in parentheses.
///
/// ```ignore
/// model! {
///     pub struct User ("users") {
///         id => Field::string().primary_key().default_fn(next_id),
///         name => Field::string(),
///         admin => Field::boolean(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    ($(#[$meta:meta])* $vis:vis struct $name:ident ($table:literal) { $($attr:ident => $field:expr),+ $(,)? }) => {
        $crate::model!(@impl ($(#[$meta])*) $vis $name, $table, $(($attr, $field)),+);
    };
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($attr:ident => $field:expr),+ $(,)? }) => {
        $crate::model!(@impl ($(#[$meta])*) $vis $name, stringify!($name), $(($attr, $field)),+);
    };
    (@impl ($(#[$meta:meta])*) $vis:vis $name:ident, $table:expr, $(($attr:ident, $field:expr)),+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        $vis struct $name {
            attrs: $crate::AttrMap,
        }

        impl $crate::Model for $name {
            fn schema() -> &'static $crate::Schema {
                static SCHEMA: ::std::sync::LazyLock<$crate::Schema> =
                    ::std::sync::LazyLock::new(|| {
                        $crate::Schema::build(
                            stringify!($name),
                            $table,
                            vec![$((stringify!($attr), $field)),+],
                        )
                        .unwrap_or_else(|e| panic!("{e}"))
                    });
                &SCHEMA
            }

            fn attrs(&self) -> &$crate::AttrMap {
                &self.attrs
            }

            fn attrs_mut(&mut self) -> &mut $crate::AttrMap {
                &mut self.attrs
            }

            fn from_attrs(attrs: $crate::AttrMap) -> Self {
                Self { attrs }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::field::Field;
    use serde_json::json;

    model! {
        struct Account ("accounts") {
            id => Field::integer().primary_key(),
            name => Field::string(),
            balance => Field::float(),
            active => Field::boolean(),
        }
    }

    #[test]
    fn test_schema_registered_once() {
        let first = Account::schema() as *const Schema;
        let second = Account::schema() as *const Schema;
        assert_eq!(first, second);
        assert_eq!(Account::schema().table(), "accounts");
        assert_eq!(Account::schema().primary_key(), "id");
    }

    #[test]
    fn test_table_defaults_to_type_name() {
        model! {
            struct Session {
                id => Field::string().primary_key(),
            }
        }
        assert_eq!(Session::schema().table(), "Session");
    }

    #[test]
    fn test_get_unset_is_null() {
        let account = Account::new();
        assert_eq!(account.get("name"), JsonValue::Null);
    }

    #[test]
    fn test_get_or_default_caches_value() {
        let mut account = Account::new();
        assert_eq!(account.get_or_default("balance"), json!(0.0));
        // cached onto the instance, visible to plain get afterwards
        assert_eq!(account.get("balance"), json!(0.0));
    }

    #[test]
    fn test_get_or_default_prefers_set_value() {
        let mut account = Account::new();
        account.set("active", true);
        assert_eq!(account.get_or_default("active"), json!(true));
    }

    #[test]
    fn test_computed_default_resolved_once() {
        use std::sync::atomic::{AtomicU64, Ordering};
        static CALLS: AtomicU64 = AtomicU64::new(0);

        model! {
            struct Token {
                id => Field::string().primary_key().default_fn(|| {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    json!("tok-1")
                }),
            }
        }

        let mut token = Token::new();
        assert_eq!(token.get_or_default("id"), json!("tok-1"));
        assert_eq!(token.get_or_default("id"), json!("tok-1"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_row_keys_by_column_name() {
        model! {
            struct Post ("posts") {
                id => Field::string().primary_key(),
                author => Field::string().column("author_id"),
            }
        }

        let mut row = RowMap::new();
        row.insert("id".to_string(), json!("p1"));
        row.insert("author_id".to_string(), json!("u1"));
        let post = Post::from_row(row);
        assert_eq!(post.get("author"), json!("u1"));
    }

    #[test]
    fn test_parse_limit_shapes() {
        assert!(matches!(parse_limit(&json!(5)), Ok(Limit::Count(5))));
        assert!(matches!(
            parse_limit(&json!([2, 3])),
            Ok(Limit::OffsetCount(2, 3))
        ));
        assert!(parse_limit(&json!("five")).is_err());
        assert!(parse_limit(&json!(-1)).is_err());
        assert!(parse_limit(&json!([1, 2, 3])).is_err());
        assert!(parse_limit(&json!([1])).is_err());
        assert!(parse_limit(&json!(1.5)).is_err());
    }
}
