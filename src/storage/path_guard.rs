//! Checks applied to client-supplied filenames before a delete.
//!
//! The guard works on the string alone. A name that passes is used verbatim as a
//! directory entry inside the store; it is never resolved or normalised, so rejecting
//! separators and `..` here is what keeps deletes inside the store directory.

use crate::error_handling::types::ServiceError;
use crate::storage::filename::CAPTURE_EXTENSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    /// Empty, or contains a path separator or `..`.
    InvalidFilename,
    /// Not a `.png` name.
    UnsupportedType,
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::InvalidFilename => ServiceError::InvalidFilename,
            PathRejection::UnsupportedType => ServiceError::UnsupportedType,
        }
    }
}

/// Accepts `name` if it is safe to hand to the store as a deletable capture name.
pub fn validate_deletable_filename(name: &str) -> Result<&str, PathRejection> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(PathRejection::InvalidFilename);
    }
    if !name.ends_with(CAPTURE_EXTENSION) {
        return Err(PathRejection::UnsupportedType);
    }
    Ok(name)
}
