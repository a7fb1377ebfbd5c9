use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_DIR, DEFAULT_STATE_FILE, DEFAULT_TELEGRAM_API_BASE,
    DEFAULT_UPDATE_INTERVAL_SECS, ENV_CHAT_ID, ENV_FEED_URL, ENV_TELEGRAM_TOKEN,
};
use crate::error::{RelayError, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Relay configuration, resolved once at startup from `config.toml` and the
/// environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed_url: String,
    pub telegram: TelegramConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub daemon: bool,
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Fixed UTC offset used when rendering timestamps. Local time when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// Prometheus exporter listen address. No exporter when unset.
    #[serde(default)]
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default, deserialize_with = "deserialize_chat_id")]
    pub chat_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub hashtags: Option<String>,
}

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

// Telegram chat ids are numeric for groups but `@name` for channels.
fn deserialize_chat_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChatId {
        Number(i64),
        Text(String),
    }

    Ok(match ChatId::deserialize(deserializer)? {
        ChatId::Number(n) => n.to_string(),
        ChatId::Text(s) => s,
    })
}

impl Config {
    /// Read `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` outside tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN) {
            self.telegram.token = token;
        }
        if let Some(chat_id) = lookup(ENV_CHAT_ID) {
            self.telegram.chat_id = chat_id;
        }
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            return Err(RelayError::Config("feed_url must not be empty".into()));
        }
        if self.telegram.token.trim().is_empty() {
            return Err(RelayError::Config(format!(
                "telegram.token is not set (config file or {})",
                ENV_TELEGRAM_TOKEN
            )));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(RelayError::Config(format!(
                "telegram.chat_id is not set (config file or {})",
                ENV_CHAT_ID
            )));
        }
        if self.update_interval_secs == 0 {
            return Err(RelayError::Config("update_interval_secs must be at least 1".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(RelayError::Config("http_timeout_secs must be at least 1".into()));
        }
        self.display_offset()?;
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// The configured fixed offset, if any.
    pub fn display_offset(&self) -> Result<Option<FixedOffset>> {
        match self.utc_offset_minutes {
            None => Ok(None),
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(Some)
                .ok_or_else(|| {
                    RelayError::Config(format!("utc_offset_minutes {} is out of range", minutes))
                }),
        }
    }
}
