//! Configuration loading
//!
//! A TOML file provides every section; `HEALTHLOG_*` environment variables
//! (after `.env` is loaded) override the secrets and deployment specifics.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use healthlog_core::logging_facility::Profile;
use healthlog_core::reminder::DEFAULT_REMINDER_MESSAGE;
use healthlog_core_types::Sensitive;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "healthlog.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing config value: {0}")]
    Missing(&'static str),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub clock: ClockConfig,
    pub gateway: GatewayConfig,
    pub reminder: ReminderConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            route: "/sms".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen.parse().map_err(|_| {
            ConfigError::Invalid(format!("server.listen is not an address: {}", self.listen))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".healthlog/log.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed offset of the log's local time from UTC
    pub utc_offset_minutes: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: -360,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: Sensitive<String>,
    pub from_number: Sensitive<String>,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com".to_string(),
            account_sid: String::new(),
            auth_token: Sensitive::default(),
            from_number: Sensitive::default(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Phone number reminded, and whose log an inbound message without a
    /// sender is filed under
    pub recipient: Sensitive<String>,
    pub message: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            recipient: Sensitive::default(),
            message: DEFAULT_REMINDER_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub profile: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

impl LogConfig {
    pub fn profile(&self) -> Result<Profile, ConfigError> {
        Profile::from_name(&self.profile)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log.profile: {}", self.profile)))
    }
}

impl Config {
    /// Load from `path`, or from `healthlog.toml` if it exists, then apply
    /// environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `HEALTHLOG_*` values; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("HEALTHLOG_GATEWAY_ACCOUNT_SID") {
            self.gateway.account_sid = v;
        }
        if let Some(v) = get("HEALTHLOG_GATEWAY_AUTH_TOKEN") {
            self.gateway.auth_token = Sensitive::new(v);
        }
        if let Some(v) = get("HEALTHLOG_GATEWAY_FROM") {
            self.gateway.from_number = Sensitive::new(v);
        }
        if let Some(v) = get("HEALTHLOG_REMINDER_RECIPIENT") {
            self.reminder.recipient = Sensitive::new(v);
        }
        if let Some(v) = get("HEALTHLOG_DB_PATH") {
            self.store.db_path = PathBuf::from(v);
        }
        if let Some(v) = get("HEALTHLOG_LISTEN") {
            self.server.listen = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.listen_addr()?;

        if !self.server.route.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.route must start with '/': {}",
                self.server.route
            )));
        }

        if self.reminder.recipient.expose().trim().is_empty() {
            return Err(ConfigError::Missing("reminder.recipient"));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gateway.timeout_secs must be > 0".to_string(),
            ));
        }

        self.log.profile()?;
        Ok(())
    }
}
