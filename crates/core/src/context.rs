//! Explicit dependencies of model operations.

use std::sync::Arc;

use crate::config::BackendMode;
use crate::storage::Storage;

/// Backend mode plus the storage engine entities delegate to.
///
/// Passed to constructors and lifecycle methods instead of reaching into
/// global state, so tests can supply their own engine and mode.
#[derive(Clone)]
pub struct Context {
    mode: BackendMode,
    storage: Arc<dyn Storage>,
}

impl Context {
    pub fn new(mode: BackendMode, storage: Arc<dyn Storage>) -> Self {
        Self { mode, storage }
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context").field("mode", &self.mode).finish_non_exhaustive()
    }
}
