//! Storage engines implementing [`hbnb_core::Storage`].
//!
//! Both engines keep record snapshots keyed by `"<Type>.<id>"`; the file
//! engine additionally mirrors them to a JSON document.

pub mod file;
pub mod in_memory;

pub use file::FileStorage;
pub use in_memory::InMemoryStorage;
