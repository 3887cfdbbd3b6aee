use std::fmt;

use warp::http::StatusCode;

/// `WWW-Authenticate` value sent with every basic-auth 401.
pub const BASIC_CHALLENGE: &str = "Basic realm=\"Admin\"";

/// A configured credential. Never printed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a configured value. Empty strings count as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Secrets the guards check against, fixed for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Token expected from capture uploaders.
    pub ingest_secret: Option<Secret>,
    /// Token/password expected from administrators.
    pub admin_secret: Option<Secret>,
}

impl AuthConfig {
    pub fn new(ingest_secret: Option<Secret>, admin_secret: Option<Secret>) -> Self {
        Self {
            ingest_secret,
            admin_secret,
        }
    }
}

/// Why a guard refused a request, in the shape the HTTP layer sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRejection {
    pub status: StatusCode,
    pub message: &'static str,
    pub challenge: Option<&'static str>,
}

impl AuthRejection {
    pub fn misconfigured() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Server configuration error",
            challenge: None,
        }
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
            challenge: None,
        }
    }

    pub fn unauthorized_basic(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
            challenge: Some(BASIC_CHALLENGE),
        }
    }
}
