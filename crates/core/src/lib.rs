//! `hbnb-core`: entity base building blocks.
//!
//! This crate contains the **model layer** only: identity, timestamps,
//! records, schema descriptors and the lifecycle shared by every entity.
//! Storage engines live in `hbnb-infra` behind the [`Storage`] trait.

pub mod base;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod id;
pub mod model;
pub mod record;
pub mod schema;
pub mod storage;
pub mod timestamp;

pub use base::BaseModel;
pub use config::BackendMode;
pub use context::Context;
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use id::{EntityId, ObjectKey};
pub use model::Model;
pub use record::Record;
pub use schema::{BoundSchema, Column, ColumnType, FieldDecl, FieldRepr, ModelSchema};
pub use storage::{Storage, StorageError, StorageResult};
pub use timestamp::Timestamp;
