use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use log::{debug, error};

use super::comparator::constant_time_eq;
use super::types::{AuthConfig, AuthRejection, Secret};

/// Standard alphabet, padding optional. Shared with image payload decoding.
pub const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const BEARER_PREFIX: &str = "Bearer ";
const BASIC_PREFIX: &str = "Basic ";

/// Authentication policy attached to a route.
///
/// A guard is a pure decision over the raw `Authorization` header and the configured
/// secrets: it holds no state and can be evaluated from any number of tasks at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGuard {
    /// `Authorization: Bearer <ingest secret>`
    IngestToken,
    /// `Authorization: Bearer <admin secret>`
    AdminToken,
    /// `Authorization: Basic base64(<any user>:<admin secret>)`
    AdminBasic,
}

impl AuthGuard {
    /// Name of the setting that provides this guard's secret, for log lines.
    pub fn secret_name(&self) -> &'static str {
        match self {
            AuthGuard::IngestToken => "API_KEY",
            AuthGuard::AdminToken | AuthGuard::AdminBasic => "ADMIN_API_KEY",
        }
    }

    fn secret<'a>(&self, config: &'a AuthConfig) -> Option<&'a Secret> {
        match self {
            AuthGuard::IngestToken => config.ingest_secret.as_ref(),
            AuthGuard::AdminToken | AuthGuard::AdminBasic => config.admin_secret.as_ref(),
        }
    }

    /// Decides whether a request carrying `authorization` may proceed.
    ///
    /// `authorization` is `None` when the header is missing or is not valid text.
    pub fn check(
        &self,
        authorization: Option<&str>,
        config: &AuthConfig,
    ) -> Result<(), AuthRejection> {
        let secret = match self.secret(config) {
            Some(secret) => secret,
            None => {
                error!("{} is not configured", self.secret_name());
                return Err(AuthRejection::misconfigured());
            }
        };

        match self {
            AuthGuard::IngestToken | AuthGuard::AdminToken => check_bearer(authorization, secret),
            AuthGuard::AdminBasic => check_basic(authorization, secret),
        }
    }
}

fn check_bearer(authorization: Option<&str>, secret: &Secret) -> Result<(), AuthRejection> {
    let header = authorization
        .ok_or_else(|| AuthRejection::unauthorized("Authorization header required"))?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthRejection::unauthorized("Bearer token required"))?;

    if !constant_time_eq(token, secret.expose()) {
        debug!("Bearer token rejected");
        return Err(AuthRejection::unauthorized("Invalid token"));
    }
    Ok(())
}

fn check_basic(authorization: Option<&str>, secret: &Secret) -> Result<(), AuthRejection> {
    let header =
        authorization.ok_or_else(|| AuthRejection::unauthorized_basic("Authentication required"))?;
    let encoded = header
        .strip_prefix(BASIC_PREFIX)
        .ok_or_else(|| AuthRejection::unauthorized_basic("Basic authentication required"))?;

    let credentials = BASE64_LENIENT
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AuthRejection::unauthorized_basic("Invalid credentials format"))?;

    // Username is not checked.
    let password = match credentials.split_once(':') {
        Some((_, password)) if !password.is_empty() => password,
        _ => return Err(AuthRejection::unauthorized_basic("Password required")),
    };

    if !constant_time_eq(password, secret.expose()) {
        debug!("Basic credentials rejected");
        return Err(AuthRejection::unauthorized_basic("Invalid credentials"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::BASIC_CHALLENGE;
    use base64::engine::general_purpose::STANDARD;
    use warp::http::StatusCode;

    fn config() -> AuthConfig {
        AuthConfig::new(Secret::new("ingest-key"), Secret::new("admin-key"))
    }

    fn basic(pair: &str) -> String {
        format!("Basic {}", STANDARD.encode(pair))
    }

    fn message(result: Result<(), AuthRejection>) -> &'static str {
        result.unwrap_err().message
    }

    #[test]
    fn test_bearer_accepts_matching_token() {
        let cfg = config();
        assert!(AuthGuard::IngestToken
            .check(Some("Bearer ingest-key"), &cfg)
            .is_ok());
        assert!(AuthGuard::AdminToken
            .check(Some("Bearer admin-key"), &cfg)
            .is_ok());
    }

    #[test]
    fn test_bearer_tokens_are_not_interchangeable() {
        let cfg = config();
        assert_eq!(
            message(AuthGuard::IngestToken.check(Some("Bearer admin-key"), &cfg)),
            "Invalid token"
        );
        assert_eq!(
            message(AuthGuard::AdminToken.check(Some("Bearer ingest-key"), &cfg)),
            "Invalid token"
        );
    }

    #[test]
    fn test_bearer_rejection_order() {
        let cfg = config();
        let guard = AuthGuard::AdminToken;

        let missing = guard.check(None, &cfg).unwrap_err();
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
        assert_eq!(missing.message, "Authorization header required");
        assert_eq!(missing.challenge, None);

        assert_eq!(
            message(guard.check(Some("Token admin-key"), &cfg)),
            "Bearer token required"
        );
        assert_eq!(
            message(guard.check(Some("bearer admin-key"), &cfg)),
            "Bearer token required"
        );
        assert_eq!(message(guard.check(Some("Bearer "), &cfg)), "Invalid token");
        assert_eq!(
            message(guard.check(Some("Bearer admin-ke"), &cfg)),
            "Invalid token"
        );
    }

    #[test]
    fn test_unconfigured_secret_is_server_error() {
        let cfg = AuthConfig::default();
        for guard in [AuthGuard::IngestToken, AuthGuard::AdminToken, AuthGuard::AdminBasic] {
            let rejection = guard.check(Some("Bearer anything"), &cfg).unwrap_err();
            assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(rejection.message, "Server configuration error");
            assert_eq!(rejection.challenge, None);
        }
    }

    #[test]
    fn test_config_error_wins_over_missing_header() {
        let cfg = AuthConfig::new(Secret::new("ingest-key"), None);
        let rejection = AuthGuard::AdminToken.check(None, &cfg).unwrap_err();
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(AuthGuard::IngestToken
            .check(Some("Bearer ingest-key"), &cfg)
            .is_ok());
    }

    #[test]
    fn test_basic_accepts_any_username() {
        let cfg = config();
        assert!(AuthGuard::AdminBasic
            .check(Some(basic("admin:admin-key").as_str()), &cfg)
            .is_ok());
        assert!(AuthGuard::AdminBasic
            .check(Some(basic(":admin-key").as_str()), &cfg)
            .is_ok());
    }

    #[test]
    fn test_basic_password_may_contain_colons() {
        let cfg = AuthConfig::new(None, Secret::new("pa:ss"));
        assert!(AuthGuard::AdminBasic
            .check(Some(basic("user:pa:ss").as_str()), &cfg)
            .is_ok());
    }

    #[test]
    fn test_basic_unpadded_payload_is_accepted() {
        let cfg = config();
        // "u:admin-key" encodes with one padding byte.
        let header = basic("u:admin-key");
        assert!(header.ends_with('='));
        let unpadded = header.trim_end_matches('=');
        assert!(AuthGuard::AdminBasic.check(Some(unpadded), &cfg).is_ok());
    }

    #[test]
    fn test_basic_rejections_carry_challenge() {
        let cfg = config();
        let guard = AuthGuard::AdminBasic;
        let not_base64 = "Basic !!!not-base64!!!".to_string();
        let not_utf8 = format!("Basic {}", STANDARD.encode([0xff, 0xfe, 0x3a, 0x41]));

        let cases: Vec<(Option<&str>, &str)> = vec![
            (None, "Authentication required"),
            (Some("Bearer admin-key"), "Basic authentication required"),
            (Some(not_base64.as_str()), "Invalid credentials format"),
            (Some(not_utf8.as_str()), "Invalid credentials format"),
        ];
        for (header, expected) in cases {
            let rejection = guard.check(header, &cfg).unwrap_err();
            assert_eq!(rejection.status, StatusCode::UNAUTHORIZED);
            assert_eq!(rejection.message, expected);
            assert_eq!(rejection.challenge, Some(BASIC_CHALLENGE));
        }

        for pair in ["admin", "admin:"] {
            let rejection = guard.check(Some(basic(pair).as_str()), &cfg).unwrap_err();
            assert_eq!(rejection.message, "Password required");
            assert_eq!(rejection.challenge, Some(BASIC_CHALLENGE));
        }

        let wrong = guard.check(Some(basic("admin:ingest-key").as_str()), &cfg).unwrap_err();
        assert_eq!(wrong.message, "Invalid credentials");
        assert_eq!(wrong.challenge, Some(BASIC_CHALLENGE));
    }
}
