//! Usage: Process settings (defaults -> optional TOML file -> `SIGO_*` environment).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "https://localhost:7241/api";
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
pub const DEFAULT_GATEWAY_PORT: u16 = 3000;
pub const MAX_GATEWAY_PORT: u16 = 3100;
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

const DEFAULT_CONFIG_FILE: &str = "sigo-gateway.toml";
const ENV_PREFIX: &str = "SIGO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    #[default]
    Development,
    Production,
}

impl DeploymentMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl<'de> Deserialize<'de> for DeploymentMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown deployment mode `{raw}` (expected development or production)"
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub mode: DeploymentMode,
    pub listen_host: String,
    pub port: u16,
    pub log_dir: Option<PathBuf>,
    pub log_retention_days: u32,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    backend_url: String,
    mode: DeploymentMode,
    listen_host: String,
    port: u16,
    log_dir: Option<PathBuf>,
    log_retention_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            mode: DeploymentMode::default(),
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            log_dir: None,
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match config_file {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config = defaults_builder()?
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let raw: RawSettings = config.try_deserialize()?;

        Ok(Self {
            backend_url: normalize_backend_url(&raw.backend_url),
            mode: raw.mode,
            listen_host: raw.listen_host.trim().to_string(),
            port: raw.port,
            log_dir: raw.log_dir.filter(|p| !p.as_os_str().is_empty()),
            log_retention_days: raw.log_retention_days.max(1),
        })
    }
}

fn defaults_builder(
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Config::builder()
        .set_default("backend_url", DEFAULT_BACKEND_URL)?
        .set_default("mode", DeploymentMode::default().as_str())?
        .set_default("listen_host", DEFAULT_LISTEN_HOST)?
        .set_default("port", DEFAULT_GATEWAY_PORT as i64)?
        .set_default("log_retention_days", DEFAULT_LOG_RETENTION_DAYS as i64)
}

/// Trailing slashes are stripped; a blank value means "not configured".
pub fn normalize_backend_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BACKEND_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
