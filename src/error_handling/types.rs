use std::fmt;

use warp::http::StatusCode;

use crate::auth::types::AuthRejection;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures of the capture store.
///
/// `NotFound` is only produced by the existence check of a delete. Anything that goes
/// wrong while touching the filesystem afterwards is `Io`, even if the underlying error
/// kind is "not found" (another request removed the file first).
#[derive(Debug)]
pub enum StorageError {
    NotFound,
    Io {
        operation: &'static str,
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        StorageError::Io { operation, source }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "Capture not found"),
            StorageError::Io { operation, source } => {
                write!(f, "Storage {} failed: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::NotFound => None,
            StorageError::Io { source, .. } => Some(source),
        }
    }
}

/// Everything a capture endpoint can answer with besides success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Auth(AuthRejection),
    Validation(String),
    InvalidFilename,
    UnsupportedType,
    NotFound,
    /// Storage failure. The message is the client-facing one and never carries paths.
    Storage(&'static str),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Auth(rejection) => rejection.status,
            ServiceError::Validation(_)
            | ServiceError::InvalidFilename
            | ServiceError::UnsupportedType => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::Auth(rejection) => rejection.message,
            ServiceError::Validation(message) => message,
            ServiceError::InvalidFilename => "Invalid filename",
            ServiceError::UnsupportedType => "Only PNG files can be deleted",
            ServiceError::NotFound => "File not found",
            ServiceError::Storage(message) => message,
        }
    }

    /// Value for a `WWW-Authenticate` response header, if this error carries one.
    pub fn challenge(&self) -> Option<&'static str> {
        match self {
            ServiceError::Auth(rejection) => rejection.challenge,
            _ => None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.status().as_u16())
    }
}

impl std::error::Error for ServiceError {}

impl From<AuthRejection> for ServiceError {
    fn from(rejection: AuthRejection) -> Self {
        ServiceError::Auth(rejection)
    }
}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::BASIC_CHALLENGE;

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(ServiceError::InvalidFilename.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::UnsupportedType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::Validation("Unknown field: x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::Storage("Failed to save image").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_keeps_challenge() {
        let err: ServiceError = AuthRejection::unauthorized_basic("Invalid credentials").into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(err.challenge(), Some(BASIC_CHALLENGE));
        assert_eq!(ServiceError::NotFound.challenge(), None);
    }

    #[test]
    fn test_storage_error_display_names_operation() {
        let err = StorageError::io(
            "write",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Storage write failed: denied");
        assert_eq!(StorageError::NotFound.to_string(), "Capture not found");
    }
}
