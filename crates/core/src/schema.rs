//! Field declarations and their backend-specific representation.
//!
//! A variant declares each domain field once. Binding the declaration to a
//! [`BackendMode`] selects its representation: a schema-mapped column in
//! database mode, a plain attribute with a default in file mode. Callers go
//! through [`BoundSchema`] and never branch on the mode themselves.

use serde_json::Value;

use crate::config::BackendMode;
use crate::error::{ModelError, ModelResult};
use crate::record::{self, Record};
use crate::timestamp::Timestamp;

/// Column type of a schema-mapped field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Text with a maximum length in characters.
    String { max_length: usize },
    Integer,
    Float,
    Boolean,
    /// Canonical timestamp text.
    DateTime,
}

impl ColumnType {
    fn check(self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (ColumnType::String { max_length }, Value::String(s)) => {
                let len = s.chars().count();
                if len > max_length {
                    Err(format!("length {len} exceeds maximum of {max_length}"))
                } else {
                    Ok(())
                }
            }
            (ColumnType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (ColumnType::Float, Value::Number(_)) => Ok(()),
            (ColumnType::Boolean, Value::Bool(_)) => Ok(()),
            (ColumnType::DateTime, Value::String(s)) => Timestamp::parse(s)
                .map(|_| ())
                .map_err(|e| format!("not a timestamp: {e}")),
            (expected, other) => Err(format!("expected {expected:?}, got {other}")),
        }
    }
}

/// Database column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: &'static str,
    column_type: ColumnType,
    nullable: bool,
}

impl Column {
    pub fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
        }
    }

    pub fn string(name: &'static str, max_length: usize) -> Self {
        Self::new(name, ColumnType::String { max_length })
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// One domain field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    column: Column,
    default: Option<Value>,
}

impl FieldDecl {
    pub fn new(column: Column) -> Self {
        Self {
            column,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.column.name
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Representation of this field under `mode`.
    pub fn repr(&self, mode: BackendMode) -> FieldRepr<'_> {
        match mode {
            BackendMode::Database => FieldRepr::Column {
                column: &self.column,
                default: self.default.as_ref(),
            },
            BackendMode::File => FieldRepr::Plain {
                default: self.default.as_ref(),
            },
        }
    }
}

/// A field as seen by the active backend.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldRepr<'a> {
    Column {
        column: &'a Column,
        default: Option<&'a Value>,
    },
    Plain {
        default: Option<&'a Value>,
    },
}

impl<'a> FieldRepr<'a> {
    pub fn default_value(&self) -> Option<&'a Value> {
        match *self {
            FieldRepr::Column { default, .. } | FieldRepr::Plain { default } => default,
        }
    }

    pub fn column(&self) -> Option<&'a Column> {
        match *self {
            FieldRepr::Column { column, .. } => Some(column),
            FieldRepr::Plain { .. } => None,
        }
    }
}

/// Declared shape of an entity variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    type_name: &'static str,
    table: Option<&'static str>,
    fields: Vec<FieldDecl>,
}

impl ModelSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table: None,
            fields: Vec::new(),
        }
    }

    /// Map the variant to a database table.
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table_name(&self) -> Option<&'static str> {
        self.table
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn bind(&self, mode: BackendMode) -> BoundSchema<'_> {
        BoundSchema { schema: self, mode }
    }
}

/// A schema resolved against the active backend mode.
#[derive(Debug, Copy, Clone)]
pub struct BoundSchema<'a> {
    schema: &'a ModelSchema,
    mode: BackendMode,
}

impl<'a> BoundSchema<'a> {
    pub fn type_name(&self) -> &'static str {
        self.schema.type_name
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Whether field names are restricted to the mapped columns.
    pub fn is_mapped(&self) -> bool {
        self.mode.is_database() && self.schema.table.is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldRepr<'a>)> + 'a {
        let mode = self.mode;
        self.schema.fields.iter().map(move |f| (f.name(), f.repr(mode)))
    }

    pub fn accepts(&self, name: &str) -> bool {
        !self.is_mapped()
            || record::BASE_FIELDS.contains(&name)
            || self.schema.fields.iter().any(|f| f.name() == name)
    }

    /// Reject names the mapped schema does not know.
    pub fn check_names<'k, I>(&self, names: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = &'k String>,
    {
        if !self.is_mapped() {
            return Ok(());
        }
        let invalid: Vec<String> = names
            .into_iter()
            .filter(|name| !self.accepts(name))
            .cloned()
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ModelError::unknown_attribute(self.type_name(), invalid))
        }
    }

    /// Check supplied values of mapped columns against their descriptors.
    ///
    /// `null` is accepted when the column is nullable or has a default.
    pub fn check_values(&self, record: &Record) -> ModelResult<()> {
        if !self.is_mapped() {
            return Ok(());
        }
        for (name, repr) in self.fields() {
            let Some(column) = repr.column() else { continue };
            match record.get(name) {
                None => {}
                Some(Value::Null) => {
                    if !column.nullable() && repr.default_value().is_none() {
                        return Err(ModelError::invalid_field(
                            self.type_name(),
                            name,
                            "must not be null",
                        ));
                    }
                }
                Some(value) => column
                    .column_type()
                    .check(value)
                    .map_err(|reason| ModelError::invalid_field(self.type_name(), name, reason))?,
            }
        }
        Ok(())
    }

    /// Fill absent or `null` declared fields with their defaults.
    pub fn apply_defaults(&self, record: &mut Record) {
        for (name, repr) in self.fields() {
            let Some(default) = repr.default_value() else { continue };
            match record.get(name) {
                None | Some(Value::Null) => {
                    record.insert(name.to_string(), default.clone());
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place_schema() -> ModelSchema {
        ModelSchema::new("Place")
            .table("places")
            .field(FieldDecl::new(Column::string("name", 8).not_null()).with_default(""))
            .field(FieldDecl::new(Column::new("rooms", ColumnType::Integer)))
            .field(FieldDecl::new(Column::new("rating", ColumnType::Float)))
            .field(FieldDecl::new(Column::new("open", ColumnType::Boolean)))
            .field(FieldDecl::new(Column::new("opened_at", ColumnType::DateTime)))
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn repr_follows_mode() {
        let schema = place_schema();
        let name = &schema.fields()[0];
        match name.repr(BackendMode::Database) {
            FieldRepr::Column { column, default } => {
                assert_eq!(column.name(), "name");
                assert!(!column.nullable());
                assert_eq!(default, Some(&json!("")));
            }
            _ => panic!("Expected column representation in database mode"),
        }
        match name.repr(BackendMode::File) {
            FieldRepr::Plain { default } => assert_eq!(default, Some(&json!(""))),
            _ => panic!("Expected plain representation in file mode"),
        }
    }

    #[test]
    fn database_mode_accepts_base_fields_and_columns_only() {
        let schema = place_schema();
        let bound = schema.bind(BackendMode::Database);
        assert!(bound.is_mapped());
        for name in ["id", "created_at", "updated_at", "__class__", "_backend_state", "name", "rooms"] {
            assert!(bound.accepts(name), "{name} should be accepted");
        }
        assert!(!bound.accepts("bogus_field"));

        let fields = record(json!({"id": "x", "bogus_field": 1, "another": 2, "name": "a"}));
        let err = bound.check_names(fields.keys()).unwrap_err();
        assert_eq!(
            err,
            ModelError::unknown_attribute("Place", vec!["another".into(), "bogus_field".into()])
        );
    }

    #[test]
    fn file_mode_accepts_anything() {
        let schema = place_schema();
        let bound = schema.bind(BackendMode::File);
        assert!(!bound.is_mapped());
        let fields = record(json!({"bogus_field": 1, "name": 42}));
        assert!(bound.check_names(fields.keys()).is_ok());
        assert!(bound.check_values(&fields).is_ok());
    }

    #[test]
    fn schema_without_table_is_unrestricted_in_database_mode() {
        let schema = ModelSchema::new("BaseModel");
        let bound = schema.bind(BackendMode::Database);
        assert!(!bound.is_mapped());
        assert!(bound.accepts("anything"));
    }

    #[test]
    fn check_values_enforces_column_types() {
        let schema = place_schema();
        let bound = schema.bind(BackendMode::Database);

        let ok = record(json!({
            "name": "Loft",
            "rooms": 3,
            "rating": 4.5,
            "open": true,
            "opened_at": "2017-09-28T21:03:54.052298"
        }));
        assert!(bound.check_values(&ok).is_ok());

        for bad in [
            json!({"name": 7}),
            json!({"name": "far too long"}),
            json!({"rooms": 2.5}),
            json!({"rating": "high"}),
            json!({"open": 1}),
            json!({"opened_at": "yesterday"}),
        ] {
            let err = bound.check_values(&record(bad.clone())).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidField { .. }),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn string_length_counts_characters() {
        let schema = place_schema();
        let bound = schema.bind(BackendMode::Database);
        assert!(bound.check_values(&record(json!({"name": "ééééé"}))).is_ok());
    }

    #[test]
    fn null_is_allowed_for_defaulted_or_nullable_columns() {
        let schema = place_schema()
            .field(FieldDecl::new(Column::string("code", 4).not_null()));
        let bound = schema.bind(BackendMode::Database);
        assert!(bound.check_values(&record(json!({"name": null, "rooms": null}))).is_ok());
        let err = bound.check_values(&record(json!({"code": null}))).unwrap_err();
        assert_eq!(err, ModelError::invalid_field("Place", "code", "must not be null"));
    }

    #[test]
    fn apply_defaults_fills_missing_and_null() {
        let schema = place_schema();
        for mode in [BackendMode::File, BackendMode::Database] {
            let bound = schema.bind(mode);

            let mut missing = Record::new();
            bound.apply_defaults(&mut missing);
            assert_eq!(missing.get("name"), Some(&json!("")));
            assert!(!missing.contains_key("rooms"));

            let mut null = record(json!({"name": null}));
            bound.apply_defaults(&mut null);
            assert_eq!(null.get("name"), Some(&json!("")));

            let mut set = record(json!({"name": "Loft"}));
            bound.apply_defaults(&mut set);
            assert_eq!(set.get("name"), Some(&json!("Loft")));
        }
    }
}
