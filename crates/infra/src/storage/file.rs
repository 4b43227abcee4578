use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hbnb_core::record::{self, Record};
use hbnb_core::{Entity, ObjectKey, Storage, StorageError, StorageResult};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::in_memory::InMemoryStorage;

/// JSON file engine.
///
/// Snapshots are held in memory and written as a single object mapping
/// `"<Type>.<id>"` to the entity's record. Registration and change
/// tracking touch memory only; `persist_all` and `remove` rewrite the file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    objects: InMemoryStorage,
}

impl FileStorage {
    /// Empty engine bound to `path`. Nothing is read until [`Storage::reload`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: InMemoryStorage::new(),
        }
    }

    /// Engine bound to `path` with its current contents loaded.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let storage = Self::new(path);
        storage.reload()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// `<file name>.tmp` next to the target.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    fn write_file(&self) -> StorageResult<()> {
        let objects = self.objects.snapshot()?;
        let document: Map<String, Value> = objects
            .into_iter()
            .map(|(key, record)| (key.to_string(), Value::Object(record)))
            .collect();
        let count = document.len();

        // Write beside the target, then rename over it.
        let bytes = serde_json::to_vec(&document)?;
        let staging = self.staging_path();
        if let Err(e) = fs::write(&staging, bytes).and_then(|()| fs::rename(&staging, &self.path)) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(objects = count, "file store written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    fn read_file(&self) -> StorageResult<Option<BTreeMap<ObjectKey, Record>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("file store absent");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let document: Map<String, Value> = serde_json::from_slice(&bytes)?;
        let mut objects = BTreeMap::new();
        for (text, value) in document {
            let (key, record) = decode_entry(&text, value)?;
            objects.insert(key, record);
        }
        info!(objects = objects.len(), "file store read");
        Ok(Some(objects))
    }
}

/// Validate one stored entry: the key must parse and agree with the
/// record's `__class__` and `id`.
fn decode_entry(text: &str, value: Value) -> StorageResult<(ObjectKey, Record)> {
    let key: ObjectKey = text
        .parse()
        .map_err(|_| StorageError::corrupt(format!("malformed key {text:?}")))?;
    let Value::Object(fields) = value else {
        return Err(StorageError::corrupt(format!("entry {text:?} is not an object")));
    };

    let class = record::class_of(&fields);
    let id = record::id_of(&fields);
    if class != Some(key.type_name()) || id != Some(key.id().as_str()) {
        return Err(StorageError::corrupt(format!(
            "entry {text:?} holds {}.{}",
            class.unwrap_or("?"),
            id.unwrap_or("?")
        )));
    }
    Ok((key, fields))
}

impl Storage for FileStorage {
    fn register_new(&self, entity: &dyn Entity) {
        self.objects.register_new(entity);
    }

    fn mark_changed(&self, entity: &dyn Entity) {
        self.objects.mark_changed(entity);
    }

    fn persist_all(&self) -> StorageResult<()> {
        self.write_file()
    }

    /// Drop the entry and rewrite the file. The entry stays in memory when
    /// the write fails.
    fn remove(&self, entity: &dyn Entity) -> StorageResult<()> {
        let key = entity.key();
        let Some(record) = self.objects.take(&key)? else {
            return Ok(());
        };
        if let Err(e) = self.write_file() {
            self.objects.restore(key, record)?;
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, key: &ObjectKey) -> Option<Record> {
        self.objects.get(key)
    }

    fn all(&self, type_name: Option<&str>) -> Vec<Record> {
        self.objects.all(type_name)
    }

    /// Replace memory with the file's contents. A missing file is an
    /// empty store. A malformed file leaves memory untouched.
    fn reload(&self) -> StorageResult<()> {
        let objects = self.read_file()?.unwrap_or_default();
        self.objects.replace(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hbnb_core::{BackendMode, BaseModel, Context, Model};
    use hbnb_models::State;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<FileStorage>, Context) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("file.json")));
        let ctx = Context::new(BackendMode::File, storage.clone());
        (dir, storage, ctx)
    }

    fn read_document(path: &Path) -> Map<String, Value> {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();
        assert!(storage.is_empty());
        assert!(!storage.path().exists());
    }

    #[test]
    fn registration_does_not_touch_disk() {
        let (_dir, storage, ctx) = setup();
        let _state = State::new(&ctx);
        assert_eq!(storage.len(), 1);
        assert!(!storage.path().exists());
    }

    #[test]
    fn persist_all_writes_keyed_records() {
        let (_dir, storage, ctx) = setup();
        let mut state = State::new(&ctx);
        state.set_name(&ctx, "Utah").unwrap();
        state.save(&ctx).unwrap();
        let base = BaseModel::new(&ctx);
        storage.persist_all().unwrap();

        let document = read_document(storage.path());
        assert_eq!(document.len(), 2);
        let stored = &document[&format!("State.{}", state.id())];
        assert_eq!(stored["__class__"], json!("State"));
        assert_eq!(stored["name"], json!("Utah"));
        assert_eq!(stored["updated_at"], json!(state.updated_at().to_string()));
        assert!(document.contains_key(&format!("BaseModel.{}", base.id())));
    }

    #[test]
    fn reload_restores_saved_state() {
        let (_dir, storage, ctx) = setup();
        let mut state = State::new(&ctx);
        state.set_name(&ctx, "Idaho").unwrap();
        state.save(&ctx).unwrap();

        let reopened = Arc::new(FileStorage::open(storage.path()).unwrap());
        let other = Context::new(BackendMode::File, reopened);
        let loaded = State::load(&other, state.id()).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn reload_discards_unsaved_snapshots() {
        let (_dir, storage, ctx) = setup();
        let mut saved = State::new(&ctx);
        saved.save(&ctx).unwrap();
        let pending = State::new(&ctx);
        assert_eq!(storage.len(), 2);

        storage.reload().unwrap();
        assert_eq!(storage.len(), 1);
        assert!(State::load(&ctx, pending.id()).unwrap().is_none());
        assert!(State::load(&ctx, saved.id()).unwrap().is_some());
    }

    #[test]
    fn remove_rewrites_file() {
        let (_dir, storage, ctx) = setup();
        let mut keep = State::new(&ctx);
        keep.save(&ctx).unwrap();
        let mut gone = State::new(&ctx);
        gone.save(&ctx).unwrap();
        let gone_key = format!("State.{}", gone.id());

        gone.delete(&ctx).unwrap();

        let document = read_document(storage.path());
        assert_eq!(document.len(), 1);
        assert!(!document.contains_key(&gone_key));
        assert!(document.contains_key(&format!("State.{}", keep.id())));
    }

    #[test]
    fn reload_rejects_mismatched_key() {
        let (_dir, storage, _ctx) = setup();
        let document = json!({
            "State.abc": {"__class__": "State", "id": "xyz", "name": "Ohio"}
        });
        fs::write(storage.path(), document.to_string()).unwrap();

        let err = storage.reload().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
        assert!(storage.is_empty());
    }

    #[test]
    fn reload_rejects_malformed_key_and_non_object() {
        let (_dir, storage, _ctx) = setup();
        fs::write(storage.path(), r#"{"no-dot": {}}"#).unwrap();
        assert!(matches!(storage.reload(), Err(StorageError::Corrupt(_))));

        fs::write(storage.path(), r#"{"State.a": 3}"#).unwrap();
        assert!(matches!(storage.reload(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn staging_file_is_named_after_the_whole_file_name() {
        let json = FileStorage::new("store/a.json");
        let text = FileStorage::new("store/a.txt");
        assert_eq!(json.staging_path(), PathBuf::from("store/a.json.tmp"));
        assert_eq!(text.staging_path(), PathBuf::from("store/a.txt.tmp"));
    }

    #[test]
    fn persist_all_leaves_only_the_document() {
        let (dir, storage, ctx) = setup();
        let mut state = State::new(&ctx);
        state.save(&ctx).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("file.json")]);
        assert_eq!(read_document(storage.path()).len(), 1);
    }

    #[test]
    fn failed_rename_cleans_up_staging_file() {
        let (dir, storage, ctx) = setup();
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(storage.path()).unwrap();
        fs::write(storage.path().join("occupied"), b"").unwrap();

        let mut state = State::new(&ctx);
        assert!(matches!(state.save(&ctx), Err(StorageError::Io(_))));
        assert!(!dir.path().join("file.json.tmp").exists());
    }

    #[test]
    fn failed_remove_keeps_entry_in_memory() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("missing").join("file.json")));
        let ctx = Context::new(BackendMode::File, storage.clone());
        let state = State::new(&ctx);
        let id = state.id().clone();

        assert!(matches!(state.delete(&ctx), Err(StorageError::Io(_))));
        assert_eq!(storage.len(), 1);
        assert!(State::load(&ctx, &id).unwrap().is_some());
    }

    #[test]
    fn store_stays_readable_after_empty_id_is_refused() {
        let (_dir, storage, ctx) = setup();
        let mut good = State::new(&ctx);
        good.save(&ctx).unwrap();

        let refused = State::with_fields(
            &ctx,
            json!({"id": "", "name": "Nowhere"}).as_object().cloned().unwrap(),
        );
        assert!(refused.is_err());
        let mut other = State::new(&ctx);
        other.save(&ctx).unwrap();

        let reopened = FileStorage::open(storage.path()).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(read_document(storage.path()).keys().all(|k| !k.ends_with('.')));
    }

    #[test]
    fn reload_reports_invalid_json() {
        let (_dir, storage, _ctx) = setup();
        fs::write(storage.path(), "not json").unwrap();
        assert!(matches!(storage.reload(), Err(StorageError::Serialization(_))));
    }
}
