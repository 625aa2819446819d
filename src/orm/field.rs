//! Column field descriptors.
//!
//! A [`Field`] describes one mapped column: an optional explicit column
//! name (the attribute name is used otherwise), a storage type string, a
//! primary-key flag, and a default that is either a static value or a
//! zero-argument producer invoked lazily on first read.

use serde_json::Value as JsonValue;

/// Default value policy for a field.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// No default; an unset attribute reads as null.
    None,
    /// A static default value.
    Value(JsonValue),
    /// A producer invoked on first read, e.g. an id generator.
    Computed(fn() -> JsonValue),
}

/// Describes one column of a mapped table.
#[derive(Debug, Clone)]
pub struct Field {
    /// Explicit column name; defaults to the attribute name it is bound to.
    pub name: Option<String>,
    /// Dialect storage type, e.g. `varchar(100)` or `bigint`.
    pub column_type: String,
    pub primary_key: bool,
    pub default: FieldDefault,
}

impl Field {
    fn with_type(column_type: &str) -> Self {
        Self {
            name: None,
            column_type: column_type.to_string(),
            primary_key: false,
            default: FieldDefault::None,
        }
    }

    /// A `varchar(100)` column with no default.
    pub fn string() -> Self {
        Self::with_type("varchar(100)")
    }

    /// A `boolean` column defaulting to `false`.
    pub fn boolean() -> Self {
        Self::with_type("boolean").default_value(false)
    }

    /// A `bigint` column defaulting to `0`.
    pub fn integer() -> Self {
        Self::with_type("bigint").default_value(0)
    }

    /// A `real` column defaulting to `0.0`.
    pub fn float() -> Self {
        Self::with_type("real").default_value(0.0)
    }

    /// A `text` column with no default.
    pub fn text() -> Self {
        Self::with_type("text")
    }

    /// Mark this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Override the column name (the attribute name is used otherwise).
    pub fn column(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Override the storage type string.
    pub fn column_type(mut self, column_type: &str) -> Self {
        self.column_type = column_type.to_string();
        self
    }

    /// Set a static default value.
    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Set a lazily computed default, produced on first read.
    pub fn default_fn(mut self, producer: fn() -> JsonValue) -> Self {
        self.default = FieldDefault::Computed(producer);
        self
    }

    /// Resolve this field's default, invoking a producer if present.
    pub fn resolve_default(&self) -> Option<JsonValue> {
        match &self.default {
            FieldDefault::None => None,
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::Computed(producer) => Some(producer()),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Field, {}:{}>",
            self.column_type,
            self.name.as_deref().unwrap_or("?")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_storage_types() {
        assert_eq!(Field::string().column_type, "varchar(100)");
        assert_eq!(Field::boolean().column_type, "boolean");
        assert_eq!(Field::integer().column_type, "bigint");
        assert_eq!(Field::float().column_type, "real");
        assert_eq!(Field::text().column_type, "text");
    }

    #[test]
    fn test_builtin_defaults() {
        assert_eq!(Field::string().resolve_default(), None);
        assert_eq!(Field::boolean().resolve_default(), Some(json!(false)));
        assert_eq!(Field::integer().resolve_default(), Some(json!(0)));
        assert_eq!(Field::float().resolve_default(), Some(json!(0.0)));
        assert_eq!(Field::text().resolve_default(), None);
    }

    #[test]
    fn test_computed_default_invoked_per_resolve() {
        let field = Field::string().default_fn(|| json!("generated"));
        assert_eq!(field.resolve_default(), Some(json!("generated")));
    }

    #[test]
    fn test_builders() {
        let field = Field::string()
            .primary_key()
            .column("user_id")
            .column_type("varchar(50)");
        assert!(field.primary_key);
        assert_eq!(field.name.as_deref(), Some("user_id"));
        assert_eq!(field.column_type, "varchar(50)");
    }
}
