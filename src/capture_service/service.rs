use std::sync::Arc;

use log::{error, info};

use crate::auth::{AuthConfig, AuthGuard};
use crate::capture_service::request::CaptureRequest;
use crate::error_handling::types::{ServiceError, StorageError};
use crate::storage::filename::generate_filename_now;
use crate::storage::path_guard::validate_deletable_filename;
use crate::storage::{Capture, CaptureStorage};

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCapture {
    pub filename: String,
    pub date: String,
}

/// Orchestrates authentication, naming and storage for each capture endpoint.
///
/// Holds only read-only state, so one instance serves every request.
pub struct CaptureService {
    storage: Arc<dyn CaptureStorage>,
    auth: AuthConfig,
    next_filename: fn() -> String,
}

impl CaptureService {
    pub fn new(storage: Arc<dyn CaptureStorage>, auth: AuthConfig) -> Self {
        Self {
            storage,
            auth,
            next_filename: generate_filename_now,
        }
    }

    /// Replaces the filename source, for deterministic names in tests.
    pub fn with_filename_source(mut self, next_filename: fn() -> String) -> Self {
        self.next_filename = next_filename;
        self
    }

    /// `POST /capture`: validates the body and stores the decoded image.
    pub fn ingest(
        &self,
        authorization: Option<&str>,
        body: &[u8],
    ) -> Result<SavedCapture, ServiceError> {
        AuthGuard::IngestToken.check(authorization, &self.auth)?;

        let request = CaptureRequest::from_json(body)?;
        let image = request.decode_image()?;
        let filename = (self.next_filename)();

        info!(
            "Saving capture {} (date: {}, image size: {})",
            filename,
            request.date,
            request.image.len()
        );
        self.storage.write(&filename, &image).map_err(|e| {
            error!("Failed to save capture {}: {}", filename, e);
            ServiceError::Storage("Failed to save image")
        })?;
        info!("Capture saved {}", filename);

        Ok(SavedCapture {
            filename,
            date: request.date,
        })
    }

    /// `GET /admin/captures`: every capture, newest first.
    pub fn list_captures(&self, authorization: Option<&str>) -> Result<Vec<Capture>, ServiceError> {
        AuthGuard::AdminToken.check(authorization, &self.auth)?;
        self.load_all("Failed to list captures")
    }

    /// `GET /admin/viewer`: the same listing, behind basic auth.
    pub fn viewer_captures(
        &self,
        authorization: Option<&str>,
    ) -> Result<Vec<Capture>, ServiceError> {
        AuthGuard::AdminBasic.check(authorization, &self.auth)?;
        self.load_all("Failed to render viewer")
    }

    /// `DELETE /admin/captures/:filename`. Returns the deleted name.
    pub fn delete_capture(
        &self,
        authorization: Option<&str>,
        filename: &str,
    ) -> Result<String, ServiceError> {
        AuthGuard::AdminBasic.check(authorization, &self.auth)?;
        let filename = validate_deletable_filename(filename)?;

        match self.storage.delete(filename) {
            Ok(()) => {
                info!("Capture deleted {}", filename);
                Ok(filename.to_string())
            }
            Err(StorageError::NotFound) => Err(ServiceError::NotFound),
            Err(e) => {
                error!("Failed to delete capture {}: {}", filename, e);
                Err(ServiceError::Storage("Failed to delete capture"))
            }
        }
    }

    fn load_all(&self, failure: &'static str) -> Result<Vec<Capture>, ServiceError> {
        self.storage.list().map_err(|e| {
            error!("{}: {}", failure, e);
            ServiceError::Storage(failure)
        })
    }
}
