//! Backend mode selection.

use std::sync::LazyLock;

/// Environment variable selecting the storage backend (`db` for the database).
pub const STORAGE_ENV_VAR: &str = "HBNB_TYPE_STORAGE";

/// Which storage representation entities follow.
///
/// In `Database` mode declared fields are schema-mapped columns and
/// construction rejects unmapped names. In `File` mode they are plain
/// attributes and any name is accepted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BackendMode {
    #[default]
    File,
    Database,
}

static CURRENT: LazyLock<BackendMode> = LazyLock::new(BackendMode::read_env);

impl BackendMode {
    /// Interpret a `HBNB_TYPE_STORAGE` value. Only `db` selects the database.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("db") => BackendMode::Database,
            _ => BackendMode::File,
        }
    }

    fn read_env() -> Self {
        Self::from_setting(std::env::var(STORAGE_ENV_VAR).ok().as_deref())
    }

    /// Process-wide mode, read from the environment on first use and fixed
    /// for the lifetime of the process.
    pub fn current() -> Self {
        *CURRENT
    }

    pub fn is_database(self) -> bool {
        self == BackendMode::Database
    }
}

impl core::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BackendMode::File => f.write_str("file"),
            BackendMode::Database => f.write_str("db"),
        }
    }
}
