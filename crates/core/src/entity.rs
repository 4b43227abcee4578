//! Entity trait: identity + serializable state, as seen by storage engines.

use crate::id::{EntityId, ObjectKey};
use crate::record::Record;

/// Object-safe view of an entity.
pub trait Entity {
    /// Name of the entity's variant (stored under `__class__`).
    fn type_name(&self) -> &str;

    /// Returns the entity identifier.
    fn id(&self) -> &EntityId;

    /// Transport/storage-safe snapshot.
    fn to_dict(&self) -> Record;

    fn key(&self) -> ObjectKey {
        ObjectKey::new(self.type_name(), self.id().clone())
    }
}
