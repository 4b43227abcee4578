//! Flat serialized form of an entity.

use serde_json::{Map, Value};

/// Field name → value mapping used for serialization, storage snapshots and
/// reconstruction input. Domain fields sit at top level, unnested.
pub type Record = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Reserved marker carrying the entity's type name.
pub const CLASS_FIELD: &str = "__class__";

/// Internal backend bookkeeping; accepted on input, never assigned or emitted.
pub const BACKEND_STATE_FIELD: &str = "_backend_state";

/// Names every entity accepts regardless of its schema.
pub const BASE_FIELDS: [&str; 5] = [
    ID_FIELD,
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    CLASS_FIELD,
    BACKEND_STATE_FIELD,
];

/// Names that cannot be set as plain attributes.
pub fn is_reserved(name: &str) -> bool {
    BASE_FIELDS.contains(&name)
}

/// Type name stored under `__class__`, if any.
pub fn class_of(record: &Record) -> Option<&str> {
    record.get(CLASS_FIELD).and_then(Value::as_str)
}

/// Id stored under `id`, if it is text.
pub fn id_of(record: &Record) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}
