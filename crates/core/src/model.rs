//! Model trait: the lifecycle every entity variant inherits.
//!
//! A variant declares its [`ModelSchema`] and how to wrap a [`BaseModel`];
//! construction, validation, serialization and storage delegation come from
//! the provided methods.
//!
//! ## Construction modes
//!
//! - [`Model::new`]: fresh identity and timestamps, registered with storage.
//! - [`Model::from_dict`]: rebuilt from a stored record, *not* registered
//!   (the object already exists in storage).
//! - [`Model::with_fields`]: fields processed as in `from_dict`, then
//!   registered like a fresh instance.

use std::sync::LazyLock;

use serde_json::Value;
use tracing::debug;

use crate::base::BaseModel;
use crate::context::Context;
use crate::error::{ModelError, ModelResult};
use crate::id::{EntityId, ObjectKey};
use crate::record::{self, Record};
use crate::schema::ModelSchema;
use crate::storage::StorageResult;
use crate::timestamp::Timestamp;

pub trait Model: Sized {
    /// Declared shape of this variant.
    fn schema() -> &'static ModelSchema;

    fn from_base(base: BaseModel) -> Self;

    fn base(&self) -> &BaseModel;

    fn base_mut(&mut self) -> &mut BaseModel;

    /// Fresh instance, registered with the storage engine.
    fn new(ctx: &Context) -> Self {
        let model = Self::from_base(BaseModel::fresh(Self::schema(), ctx.mode()));
        ctx.storage().register_new(model.base());
        debug!(
            type_name = model.base().type_name(),
            id = %model.base().id(),
            "registered new entity"
        );
        model
    }

    /// Instance rebuilt from a serialized record. Never registered.
    fn from_dict(ctx: &Context, fields: Record) -> ModelResult<Self> {
        BaseModel::from_fields(Self::schema(), ctx.mode(), fields).map(Self::from_base)
    }

    /// Instance built from initial fields and registered like a fresh one.
    fn with_fields(ctx: &Context, fields: Record) -> ModelResult<Self> {
        let model = Self::from_dict(ctx, fields)?;
        ctx.storage().register_new(model.base());
        debug!(
            type_name = model.base().type_name(),
            id = %model.base().id(),
            "registered new entity with initial fields"
        );
        Ok(model)
    }

    fn id(&self) -> &EntityId {
        self.base().id()
    }

    fn created_at(&self) -> Timestamp {
        self.base().created_at()
    }

    fn updated_at(&self) -> Timestamp {
        self.base().updated_at()
    }

    fn to_dict(&self) -> Record {
        self.base().to_dict()
    }

    /// Assign an attribute, validated the way construction validates it.
    fn set(&mut self, ctx: &Context, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        if record::is_reserved(name) {
            return Err(ModelError::reserved(name));
        }
        let bound = Self::schema().bind(ctx.mode());
        let mut single = Record::new();
        single.insert(name.to_string(), value.into());
        bound.check_names(single.keys())?;
        bound.check_values(&single)?;
        bound.apply_defaults(&mut single);

        let value = single.remove(name).unwrap_or(Value::Null);
        self.base_mut().set_attribute(name, value)
    }

    /// Refresh `updated_at` and persist through the storage engine.
    ///
    /// `updated_at` moves even when no other field changed.
    fn save(&mut self, ctx: &Context) -> StorageResult<()> {
        self.base_mut().touch();
        let storage = ctx.storage();
        storage.mark_changed(self.base());
        storage.persist_all()
    }

    /// Remove this entity from storage. The instance is consumed.
    fn delete(self, ctx: &Context) -> StorageResult<()> {
        ctx.storage().remove(self.base())
    }

    /// Stored instance with the given id, if any.
    fn load(ctx: &Context, id: &EntityId) -> ModelResult<Option<Self>> {
        let key = ObjectKey::new(Self::schema().type_name(), id.clone());
        ctx.storage()
            .get(&key)
            .map(|record| Self::from_dict(ctx, record))
            .transpose()
    }

    /// Every stored instance of this variant.
    fn all(ctx: &Context) -> ModelResult<Vec<Self>> {
        ctx.storage()
            .all(Some(Self::schema().type_name()))
            .into_iter()
            .map(|record| Self::from_dict(ctx, record))
            .collect()
    }
}

static BASE_SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| ModelSchema::new("BaseModel"));

/// The base is usable on its own: no table, no declared fields.
impl Model for BaseModel {
    fn schema() -> &'static ModelSchema {
        &BASE_SCHEMA
    }

    fn from_base(base: BaseModel) -> Self {
        base
    }

    fn base(&self) -> &BaseModel {
        self
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        self
    }
}
