//! Sync layer: remote address service backends.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpBackend, SyncError};
