//! Storage Trait
//!
//! This module defines the `CaptureStorage` trait, the interface between the capture
//! service and whatever holds the captured images.
//!
//! Implementors are responsible for:
//! - Persisting new captures under a caller-chosen filename
//! - Enumerating stored captures with their metadata and content
//! - Removing a capture, telling "absent" apart from "removal failed"
//!
//! No index is kept between calls; every operation reflects the backing store at the
//! moment it runs.

use crate::error_handling::types::StorageError;
use crate::storage::types::Capture;

pub trait CaptureStorage: Send + Sync {
    /// Stores `content` under `filename`, replacing any capture with the same name.
    ///
    /// `filename` is trusted: it comes from the filename generator, never from a client.
    fn write(&self, filename: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Returns all stored captures, most recently created first.
    ///
    /// Captures with the same creation time keep the backend's enumeration order, which
    /// is unspecified. Every capture is loaded fully into memory.
    fn list(&self) -> Result<Vec<Capture>, StorageError>;

    /// Removes the capture called `filename`.
    ///
    /// Returns [`StorageError::NotFound`] when no such capture exists. The existence
    /// check and the removal are separate steps; if the capture vanishes in between the
    /// result is [`StorageError::Io`].
    fn delete(&self, filename: &str) -> Result<(), StorageError>;
}
