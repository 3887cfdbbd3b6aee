use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::types::FileConfig;
use crate::auth::{AuthConfig, Secret};
use crate::error_handling::types::ConfigError;

pub const DEFAULT_PORT: u16 = 3050;
pub const DEFAULT_CAPTURES_DIR: &str = "captures";
/// Large enough for a base64 encoded 720p frame with plenty of headroom.
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 60;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Command-line arguments.
///
/// Each setting can come from a flag, an environment variable or the TOML file given
/// with `--config`, in that order of precedence. Unset values fall back to the
/// defaults above.
#[derive(Parser, Debug, Clone)]
#[command(name = "sentry-api")]
#[command(version)]
#[command(about = "Capture ingestion and admin API for Pi Sentry cameras")]
pub struct Args {
    /// TOML file with any of the settings below
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bearer token cameras use to upload captures
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token and basic-auth password for the admin endpoints
    #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
    pub admin_api_key: Option<String>,

    /// Directory captures are stored in [default: captures]
    #[arg(long, env = "CAPTURES_DIR")]
    pub captures_dir: Option<PathBuf>,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind_address: Option<IpAddr>,

    /// Port to listen on [default: 3050]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Maximum request body size in bytes [default: 10485760]
    #[arg(long, env = "BODY_LIMIT")]
    pub body_limit: Option<u64>,

    /// Requests allowed per client and window [default: 60]
    #[arg(long, env = "RATE_LIMIT_MAX")]
    pub rate_limit_max: Option<u32>,

    /// Rate limit window length in seconds [default: 60]
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: Option<u64>,
}

/// Resolved runtime configuration. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub captures_dir: PathBuf,
    pub bind_address: IpAddr,
    pub port: u16,
    pub body_limit: u64,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    /// Parses the process arguments and environment, then loads `--config` if given.
    /// Invalid arguments exit the process with clap's usage message.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::resolve(Args::parse())
    }

    pub fn resolve(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Combines arguments with file values, arguments first.
    pub fn merge(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let ingest_secret = args.api_key.or(file.api_key).and_then(Secret::new);
        let admin_secret = args
            .admin_api_key
            .or(file.admin_api_key)
            .and_then(Secret::new);

        let body_limit = args
            .body_limit
            .or(file.body_limit)
            .unwrap_or(DEFAULT_BODY_LIMIT);
        if body_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "body_limit must be greater than 0".to_string(),
            ));
        }

        let rate_limit_max = args
            .rate_limit_max
            .or(file.rate_limit_max)
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX);
        if rate_limit_max == 0 {
            return Err(ConfigError::InvalidValue(
                "rate_limit_max must be greater than 0".to_string(),
            ));
        }

        let window_secs = args
            .rate_limit_window_secs
            .or(file.rate_limit_window_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
        if window_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "rate_limit_window_secs must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            auth: AuthConfig::new(ingest_secret, admin_secret),
            captures_dir: args
                .captures_dir
                .or(file.captures_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CAPTURES_DIR)),
            bind_address: args
                .bind_address
                .or(file.bind_address)
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            body_limit,
            rate_limit_max,
            rate_limit_window: Duration::from_secs(window_secs),
        })
    }
}
