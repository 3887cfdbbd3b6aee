use std::net::IpAddr;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error_handling::types::ConfigError;

/// Optional TOML configuration file. Every key may be omitted; keys mirror the
/// command-line flags in snake_case.
///
/// ```toml
/// api_key = "camera-token"
/// admin_api_key = "admin-token"
/// captures_dir = "/var/lib/sentry/captures"
/// port = 3050
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub admin_api_key: Option<String>,
    pub captures_dir: Option<PathBuf>,
    pub bind_address: Option<IpAddr>,
    pub port: Option<u16>,
    pub body_limit: Option<u64>,
    pub rate_limit_max: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration file {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }
}
