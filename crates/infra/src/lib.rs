//! Infrastructure layer: storage engines and their configuration.

pub mod config;
pub mod storage;

pub use config::{build_context, StorageSettings};
pub use storage::{FileStorage, InMemoryStorage};
