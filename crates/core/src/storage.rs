//! Storage engine boundary consumed by the model layer.
//!
//! Engines keep *snapshots* of entities (their records) keyed by
//! [`ObjectKey`]. They never own entity instances: the caller holding an
//! entity owns it, and the engine only remembers what it was last shown.

use std::sync::Arc;

use thiserror::Error;

use crate::entity::Entity;
use crate::id::ObjectKey;
use crate::record::Record;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage engine error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data that cannot be a valid entity snapshot.
    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Persistence engine used by entities.
///
/// ## Contract
///
/// - `register_new` records a freshly constructed entity as pending
///   persistence and must not fail for a well-formed entity.
/// - `mark_changed` refreshes the snapshot of an entity after mutation.
/// - `persist_all` durably writes every pending/changed snapshot.
/// - `remove` deletes the persisted state of an entity by identity; removing
///   an unknown entity is not an error.
pub trait Storage: Send + Sync {
    fn register_new(&self, entity: &dyn Entity);

    fn mark_changed(&self, entity: &dyn Entity);

    fn persist_all(&self) -> StorageResult<()>;

    fn remove(&self, entity: &dyn Entity) -> StorageResult<()>;

    /// Snapshot stored under `key`.
    fn get(&self, key: &ObjectKey) -> Option<Record>;

    /// All snapshots, optionally restricted to one type name.
    fn all(&self, type_name: Option<&str>) -> Vec<Record>;

    /// Replace in-memory state with the durable copy.
    fn reload(&self) -> StorageResult<()>;
}

impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    fn register_new(&self, entity: &dyn Entity) {
        (**self).register_new(entity)
    }

    fn mark_changed(&self, entity: &dyn Entity) {
        (**self).mark_changed(entity)
    }

    fn persist_all(&self) -> StorageResult<()> {
        (**self).persist_all()
    }

    fn remove(&self, entity: &dyn Entity) -> StorageResult<()> {
        (**self).remove(entity)
    }

    fn get(&self, key: &ObjectKey) -> Option<Record> {
        (**self).get(key)
    }

    fn all(&self, type_name: Option<&str>) -> Vec<Record> {
        (**self).all(type_name)
    }

    fn reload(&self) -> StorageResult<()> {
        (**self).reload()
    }
}
