//! Common test utilities for litepost tests

pub mod fake_api;
pub mod fixtures;

// Re-exports for convenience - not all test binaries use all exports
#[allow(unused_imports)]
pub use fake_api::{FakePostsApi, Outcome, RecordingInvalidator, RecordingObserver, Update};
#[allow(unused_imports)]
pub use fixtures::*;
