//! Configuration loading and management
//!
//! Handles parsing of `questlog.toml` from the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Experience and leveling configuration
    #[serde(default)]
    pub exp: ExpConfig,

    /// Chat relay configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Weather index configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Experience and leveling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpConfig {
    /// Points awarded for completing a task
    #[serde(default = "default_exp_award")]
    pub award: u64,

    /// Points needed to advance one level
    #[serde(default = "default_level_size")]
    pub level_size: u64,
}

fn default_exp_award() -> u64 {
    50
}

fn default_level_size() -> u64 {
    100
}

impl Default for ExpConfig {
    fn default() -> Self {
        Self {
            award: default_exp_award(),
            level_size: default_level_size(),
        }
    }
}

/// Chat relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Endpoint answering `GET ?q=<text>` with a plain-text reply
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
}

fn default_chat_endpoint() -> String {
    "http://localhost:5137".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
        }
    }
}

/// Weather index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Pollutant standards index endpoint
    #[serde(default = "default_psi_url")]
    pub psi_url: String,

    /// UV index endpoint
    #[serde(default = "default_uv_url")]
    pub uv_url: String,

    /// Region key for the 24-hourly PSI reading
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_psi_url() -> String {
    "https://api.data.gov.sg/v1/environment/psi".to_string()
}

fn default_uv_url() -> String {
    "https://api.data.gov.sg/v1/environment/uv-index".to_string()
}

fn default_region() -> String {
    "central".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            psi_url: default_psi_url(),
            uv_url: default_uv_url(),
            region: default_region(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Lock acquisition timeout in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Debounce applied to filesystem change notifications
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_watch_debounce_ms() -> u64 {
    200
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

pub const CONFIG_FILENAME: &str = "questlog.toml";

impl Config {
    /// Load configuration from a `questlog.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_data_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILENAME);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.exp.award == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "exp.award must be > 0".to_string(),
            ));
        }
        if self.exp.level_size == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "exp.level_size must be > 0".to_string(),
            ));
        }
        if self.chat.endpoint.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "chat.endpoint cannot be empty".to_string(),
            ));
        }
        if self.weather.psi_url.trim().is_empty() || self.weather.uv_url.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "weather endpoints cannot be empty".to_string(),
            ));
        }
        if self.weather.region.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "weather.region cannot be empty".to_string(),
            ));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.exp.award, 50);
        assert_eq!(cfg.exp.level_size, 100);
        assert_eq!(cfg.chat.endpoint, "http://localhost:5137");
        assert_eq!(cfg.weather.region, "central");
        assert_eq!(cfg.store.lock_timeout_ms, 5000);
        assert_eq!(cfg.store.watch_debounce_ms, 200);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        let content = r#"
[exp]
award = 25
level_size = 200

[chat]
endpoint = "http://127.0.0.1:9000"

[weather]
region = "west"

[store]
lock_timeout_ms = 1000
watch_debounce_ms = 50
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.exp.award, 25);
        assert_eq!(cfg.exp.level_size, 200);
        assert_eq!(cfg.chat.endpoint, "http://127.0.0.1:9000");
        assert_eq!(cfg.weather.region, "west");
        assert_eq!(cfg.weather.psi_url, default_psi_url());
        assert_eq!(cfg.store.lock_timeout_ms, 1000);
        assert_eq!(cfg.store.watch_debounce_ms, 50);
    }

    #[test]
    fn zero_award_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[exp]\naward = 0\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_from_data_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_data_dir(dir.path());
        assert_eq!(cfg.exp.award, 50);
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        let cfg = Config::default();
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("award = 50"));
    }
}
