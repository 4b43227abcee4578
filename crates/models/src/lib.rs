//! Entity variants of the application.
//!
//! Each variant declares its fields once and inherits construction,
//! validation, serialization and storage delegation from
//! [`hbnb_core::Model`].

pub mod state;

pub use state::State;
