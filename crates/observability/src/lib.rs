//! Process-wide logging setup shared by binaries and tests.

pub mod subscriber;

pub use subscriber::{init_with, LogFormat};

/// Initialize tracing with the format chosen by `HBNB_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init_with(LogFormat::from_env());
}

/// Human-readable output captured by the test harness.
pub fn init_for_tests() {
    subscriber::init_test();
}
