//! Identifiers used across the model layer.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Opaque, globally unique entity identifier.
///
/// Generated locally at construction so references are valid before any
/// persistence happens. Ids revived from stored records are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new identifier (random UUIDv4 text).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// Storage key of an entity: `<TypeName>.<id>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    type_name: String,
    id: EntityId,
}

impl ObjectKey {
    pub fn new(type_name: impl Into<String>, id: EntityId) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }
}

impl core::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.id)
    }
}

impl FromStr for ObjectKey {
    type Err = ModelError;

    // Type names never contain a dot; ids may.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((type_name, id)) if !type_name.is_empty() && !id.is_empty() => {
                Ok(Self::new(type_name, EntityId::from(id)))
            }
            _ => Err(ModelError::invalid_field(
                "ObjectKey",
                "key",
                format!("expected <TypeName>.<id>, got {s:?}"),
            )),
        }
    }
}
