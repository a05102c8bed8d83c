use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "CATALOG_WATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "catalog-watch.yaml";
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK";
pub const LAST_ITEM_ID_ENV: &str = "LAST_ITEM_ID";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host serving the `apisite` JSON endpoints.
    pub api_base: String,
    /// Host the notification links and thumbnails point at.
    pub site_base: String,
    pub category: String,
    pub limit: u32,
    pub sort_type: u32,
    pub webhook_url: Option<String>,
    pub mention: Option<String>,
    pub request_timeout_secs: u64,
    pub state: StateConfig,
    /// When set the process keeps running and polls on this interval.
    pub interval_secs: Option<u64>,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://www.pekora.zip".to_string(),
            site_base: "https://www.pekora.zip".to_string(),
            category: "Collectibles".to_string(),
            limit: 5,
            sort_type: 3,
            webhook_url: None,
            mention: None,
            request_timeout_secs: 10,
            state: StateConfig::default(),
            interval_secs: None,
            metrics_addr: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum StateConfig {
    /// Seeded from `LAST_ITEM_ID`, writes only live as long as the process.
    Env,
    File {
        #[serde(default = "default_state_path")]
        path: PathBuf,
    },
}

impl Default for StateConfig {
    fn default() -> Self {
        Self::Env
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("last_item_id.txt")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no webhook url configured, set DISCORD_WEBHOOK or `webhook_url`")]
    MissingWebhook,
    #[error("`limit` must be at least 1")]
    ZeroLimit,
}

impl Config {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null, which is not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Loads the YAML file at `path`, a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(r) => r,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {:?}, using defaults", path);
                String::new()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config file named by the environment and applies the
    /// environment overrides on top.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::load(&path)?;
        config.apply_overrides(std::env::var(WEBHOOK_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, webhook: Option<String>) {
        if let Some(url) = webhook.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::MissingWebhook);
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}
