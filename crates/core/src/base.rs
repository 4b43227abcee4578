//! Shared state of every entity: identity, timestamps and attributes.

use serde_json::Value;
use tracing::warn;

use crate::config::BackendMode;
use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::id::EntityId;
use crate::record::{
    self, Record, BACKEND_STATE_FIELD, CLASS_FIELD, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use crate::schema::ModelSchema;
use crate::timestamp::Timestamp;

/// Identity, temporal metadata and attributes common to all variants.
///
/// `id` and `created_at` never change after construction. `updated_at`
/// only moves forward. Everything else lives in `attributes`, keyed by the
/// externally visible field name in both backend modes.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseModel {
    type_name: &'static str,
    id: EntityId,
    created_at: Timestamp,
    updated_at: Timestamp,
    attributes: Record,
}

impl BaseModel {
    /// Fresh state: new id, `created_at == updated_at == now`, defaults applied.
    pub fn fresh(schema: &ModelSchema, mode: BackendMode) -> Self {
        let now = Timestamp::now();
        let mut attributes = Record::new();
        schema.bind(mode).apply_defaults(&mut attributes);
        Self {
            type_name: schema.type_name(),
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            attributes,
        }
    }

    /// State rebuilt from supplied fields.
    ///
    /// Markers are discarded, unmapped names are rejected under a mapped
    /// schema, identity and timestamps fall back to fresh values when absent.
    pub fn from_fields(
        schema: &ModelSchema,
        mode: BackendMode,
        mut fields: Record,
    ) -> ModelResult<Self> {
        let bound = schema.bind(mode);
        let type_name = schema.type_name();
        bound.check_names(fields.keys())?;

        if let Some(Value::String(class)) = fields.remove(CLASS_FIELD) {
            if class != type_name {
                warn!(expected = type_name, found = %class, "record type marker mismatch");
            }
        }
        fields.remove(BACKEND_STATE_FIELD);

        let id = take_id(&mut fields, type_name)?.unwrap_or_default();
        let now = Timestamp::now();
        let created_at = take_timestamp(&mut fields, type_name, CREATED_AT_FIELD)?.unwrap_or(now);
        let updated_at = take_timestamp(&mut fields, type_name, UPDATED_AT_FIELD)?.unwrap_or(now);

        bound.check_values(&fields)?;
        bound.apply_defaults(&mut fields);

        Ok(Self {
            type_name,
            id,
            created_at,
            updated_at,
            attributes: fields,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attributes other than identity and timestamps.
    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    /// Assign a plain attribute. Identity, timestamps and markers are refused.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ModelResult<()> {
        let name = name.into();
        if record::is_reserved(&name) {
            return Err(ModelError::reserved(name));
        }
        self.attributes.insert(name, value.into());
        Ok(())
    }

    /// Move `updated_at` strictly forward.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.advanced();
    }

    /// Every instance attribute, identity and timestamps included.
    fn instance_fields(&self) -> Record {
        let mut fields = self.attributes.clone();
        fields.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        fields.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(self.created_at.to_string()),
        );
        fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(self.updated_at.to_string()),
        );
        fields
    }

    /// Snapshot with canonical timestamps and the `__class__` marker.
    pub fn to_dict(&self) -> Record {
        let mut fields = self.instance_fields();
        fields.insert(CLASS_FIELD.to_string(), Value::String(self.type_name.to_string()));
        fields
    }
}

impl Entity for BaseModel {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn to_dict(&self) -> Record {
        BaseModel::to_dict(self)
    }
}

impl core::fmt::Display for BaseModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] ({}) {}",
            self.type_name,
            self.id,
            Value::Object(self.instance_fields())
        )
    }
}

fn take_id(fields: &mut Record, type_name: &str) -> ModelResult<Option<EntityId>> {
    match fields.remove(ID_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if id.is_empty() => Err(ModelError::invalid_field(
            type_name,
            ID_FIELD,
            "must not be empty",
        )),
        Some(Value::String(id)) => Ok(Some(EntityId::from(id))),
        Some(other) => Err(ModelError::invalid_field(
            type_name,
            ID_FIELD,
            format!("expected a string, got {other}"),
        )),
    }
}

fn take_timestamp(
    fields: &mut Record,
    type_name: &str,
    field: &str,
) -> ModelResult<Option<Timestamp>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Timestamp::parse(&text)
            .map(Some)
            .map_err(|e| ModelError::invalid_timestamp(field, text, e)),
        Some(other) => Err(ModelError::invalid_field(
            type_name,
            field,
            format!("expected timestamp text, got {other}"),
        )),
    }
}
