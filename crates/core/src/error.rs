//! Model error model.

use thiserror::Error;

/// Result type used across the model layer.
pub type ModelResult<T> = Result<T, ModelError>;

/// Model-level error.
///
/// Raised synchronously while building or mutating an entity. A failed
/// construction never yields a partially built instance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Supplied field names that the variant's database schema does not map.
    #[error("invalid attribute(s) for {type_name} in database storage: {}", .fields.join(", "))]
    UnknownAttribute {
        type_name: String,
        fields: Vec<String>,
    },

    /// Timestamp text that does not match the canonical format.
    #[error("invalid timestamp for {field}: {value:?} ({source})")]
    InvalidTimestamp {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A value that does not fit the field it was supplied for.
    #[error("invalid value for {type_name}.{field}: {reason}")]
    InvalidField {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Attempt to overwrite identity, timestamps or a reserved marker.
    #[error("attribute is reserved: {0}")]
    ReservedAttribute(String),
}

impl ModelError {
    pub fn unknown_attribute(type_name: impl Into<String>, mut fields: Vec<String>) -> Self {
        fields.sort();
        Self::UnknownAttribute {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn invalid_timestamp(
        field: impl Into<String>,
        value: impl Into<String>,
        source: chrono::ParseError,
    ) -> Self {
        Self::InvalidTimestamp {
            field: field.into(),
            value: value.into(),
            source,
        }
    }

    pub fn invalid_field(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn reserved(name: impl Into<String>) -> Self {
        Self::ReservedAttribute(name.into())
    }
}
