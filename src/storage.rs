//! Storage subsystem
//!
//! This module owns every filesystem access to the capture directory.
//!
//! Components:
//! - `storage_trait`: the [`CaptureStorage`] trait defining the store API.
//! - `types`: the [`Capture`] record returned by listings.
//! - `file_storage`: directory-backed implementation.
//! - `filename`: storage keys for new captures.
//! - `path_guard`: checks on client-supplied filenames before they reach the store.

pub mod file_storage;
pub mod filename;
pub mod path_guard;
pub mod storage_trait;
pub mod types;

pub use file_storage::FileStorage;
pub use storage_trait::CaptureStorage;
pub use types::Capture;
