use std::collections::BTreeMap;
use std::sync::RwLock;

use hbnb_core::{Entity, ObjectKey, Record, Storage, StorageError, StorageResult};
use tracing::{debug, warn};

/// In-memory snapshot store.
///
/// Intended for tests/dev. `persist_all` and `reload` have nothing to do.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    objects: RwLock<BTreeMap<ObjectKey, Record>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every snapshot, in key order.
    pub(crate) fn snapshot(&self) -> StorageResult<BTreeMap<ObjectKey, Record>> {
        let objects = self.objects.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(objects.clone())
    }

    /// Swap the whole map for `objects`.
    pub(crate) fn replace(&self, objects: BTreeMap<ObjectKey, Record>) -> StorageResult<()> {
        let mut current = self.objects.write().map_err(|_| StorageError::LockPoisoned)?;
        *current = objects;
        Ok(())
    }

    /// Remove and return the snapshot under `key`.
    pub(crate) fn take(&self, key: &ObjectKey) -> StorageResult<Option<Record>> {
        let mut objects = self.objects.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(objects.remove(key))
    }

    /// Put back a snapshot removed by [`InMemoryStorage::take`], unless a
    /// newer one was stored meanwhile.
    pub(crate) fn restore(&self, key: ObjectKey, record: Record) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| StorageError::LockPoisoned)?;
        objects.entry(key).or_insert(record);
        Ok(())
    }

    fn upsert(&self, entity: &dyn Entity) {
        let key = entity.key();
        match self.objects.write() {
            Ok(mut objects) => {
                debug!(key = %key, "snapshot stored");
                objects.insert(key, entity.to_dict());
            }
            Err(_) => warn!(key = %key, "storage lock poisoned; snapshot dropped"),
        }
    }
}

impl Storage for InMemoryStorage {
    fn register_new(&self, entity: &dyn Entity) {
        self.upsert(entity);
    }

    fn mark_changed(&self, entity: &dyn Entity) {
        self.upsert(entity);
    }

    fn persist_all(&self) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, entity: &dyn Entity) -> StorageResult<()> {
        self.take(&entity.key())?;
        Ok(())
    }

    fn get(&self, key: &ObjectKey) -> Option<Record> {
        let objects = self.objects.read().ok()?;
        objects.get(key).cloned()
    }

    fn all(&self, type_name: Option<&str>) -> Vec<Record> {
        let Ok(objects) = self.objects.read() else {
            warn!("storage lock poisoned; listing nothing");
            return Vec::new();
        };
        objects
            .iter()
            .filter(|(key, _)| type_name.is_none_or(|t| key.type_name() == t))
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn reload(&self) -> StorageResult<()> {
        Ok(())
    }
}
