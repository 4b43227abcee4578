//! Storage settings read from the environment, and the context they wire.

use std::path::PathBuf;
use std::sync::Arc;

use hbnb_core::config::STORAGE_ENV_VAR;
use hbnb_core::{BackendMode, Context, Storage, StorageResult};

use crate::storage::{FileStorage, InMemoryStorage};

/// Location of the file engine's JSON document.
pub const FILE_PATH_ENV_VAR: &str = "HBNB_FILE_PATH";
pub const DEFAULT_FILE_PATH: &str = "file.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub mode: BackendMode,
    pub file_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            mode: BackendMode::File,
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}

impl StorageSettings {
    /// Process-wide backend mode plus `HBNB_FILE_PATH`.
    pub fn from_env() -> Self {
        Self::with_mode(
            BackendMode::current(),
            std::env::var(FILE_PATH_ENV_VAR).ok().as_deref(),
        )
    }

    /// Settings from raw variable values; blank paths fall back to the default.
    pub fn from_vars(storage: Option<&str>, file_path: Option<&str>) -> Self {
        Self::with_mode(BackendMode::from_setting(storage), file_path)
    }

    fn with_mode(mode: BackendMode, file_path: Option<&str>) -> Self {
        let file_path = file_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_FILE_PATH);
        Self {
            mode,
            file_path: PathBuf::from(file_path),
        }
    }
}

/// Context with the engine the settings select.
///
/// The file backend opens (and loads) the configured document. This build
/// carries no relational engine, so the database backend keeps its
/// snapshots in memory while still enforcing the mapped schemas.
pub fn build_context(settings: &StorageSettings) -> StorageResult<Context> {
    let storage: Arc<dyn Storage> = match settings.mode {
        BackendMode::File => Arc::new(FileStorage::open(&settings.file_path)?),
        BackendMode::Database => {
            tracing::warn!(
                "{STORAGE_ENV_VAR}=db but no relational engine is available, falling back to in-memory"
            );
            Arc::new(InMemoryStorage::new())
        }
    };
    tracing::info!(mode = %settings.mode, "storage ready");
    Ok(Context::new(settings.mode, storage))
}
