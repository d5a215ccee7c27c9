//! Configuration system (layered: code > env > config file > defaults).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{FlowError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:1337";
pub const DEFAULT_CLIENT_ID: &str = "device-flow-simulator";
pub const DEFAULT_CLIENT_SECRET: &str = "simulator-secret";
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 2;

const DEVICE_CODE_PATH: &str = "/device/code";
const TOKEN_PATH: &str = "/token";

const ENV_BASE_URL: &str = "DEVICE_FLOW_BASE_URL";
const ENV_CLIENT_ID: &str = "DEVICE_FLOW_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "DEVICE_FLOW_CLIENT_SECRET";
const ENV_POLL_INTERVAL: &str = "DEVICE_FLOW_POLL_INTERVAL";
const ENV_POLLING: &str = "DEVICE_FLOW_POLLING";

/// Client configuration read by the state machine on every transition.
///
/// The demo credentials in [`FlowConfig::default`] are simulator defaults,
/// not secrets. Real deployments load them from a file or the environment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub polling_interval_secs: u64,
    pub polling_enabled: bool,
}

impl fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("polling_interval_secs", &self.polling_interval_secs)
            .field("polling_enabled", &self.polling_enabled)
            .finish()
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            polling_interval_secs: DEFAULT_POLLING_INTERVAL_SECS,
            polling_enabled: true,
        }
    }
}

/// A single configuration edit raised by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConfigUpdate {
    BaseUrl(String),
    ClientId(String),
    ClientSecret(String),
    PollingInterval(u64),
}

impl FlowConfig {
    /// Endpoint for the device authorization request.
    ///
    /// Plain concatenation: a trailing slash on `base_url` is kept as-is.
    pub fn device_code_url(&self) -> String {
        format!("{}{DEVICE_CODE_PATH}", self.base_url)
    }

    /// Endpoint for the token exchange.
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }

    /// Apply an edit. Returns `false` when the value was rejected.
    pub fn apply(&mut self, update: ConfigUpdate) -> bool {
        match update {
            ConfigUpdate::BaseUrl(url) => self.base_url = url,
            ConfigUpdate::ClientId(id) => self.client_id = id,
            ConfigUpdate::ClientSecret(secret) => self.client_secret = secret,
            ConfigUpdate::PollingInterval(0) => return false,
            ConfigUpdate::PollingInterval(secs) => self.polling_interval_secs = secs,
        }
        true
    }

    /// Default config file location (`<config dir>/device-flow/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "device-flow")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Defaults, then the config file (explicit or default path), then the
    /// environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.with_env()
    }

    /// Load from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `DEVICE_FLOW_*` environment variables (a `.env` file is
    /// honored when present).
    pub fn with_env(mut self) -> Result<Self> {
        let _ = dotenvy::dotenv();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Ok(id) = std::env::var(ENV_CLIENT_ID) {
            self.client_id = id;
        }
        if let Ok(secret) = std::env::var(ENV_CLIENT_SECRET) {
            self.client_secret = secret;
        }
        if let Ok(raw) = std::env::var(ENV_POLL_INTERVAL) {
            self.polling_interval_secs = raw.trim().parse().map_err(|_| {
                FlowError::InvalidConfig(format!("{ENV_POLL_INTERVAL} must be an integer, got {raw:?}"))
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_POLLING) {
            self.polling_enabled = parse_flag(&raw).ok_or_else(|| {
                FlowError::InvalidConfig(format!("{ENV_POLLING} must be a boolean, got {raw:?}"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polling_interval_secs == 0 {
            return Err(FlowError::InvalidConfig(
                "polling_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// TOML rendering with the client secret masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.client_secret = "[REDACTED]".to_string();
        Ok(toml::to_string_pretty(&shown)?)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
