use log::{info, warn};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "quire.toml";
pub const CONFIG_ENV: &str = "QUIRE_CONFIG";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub content: ContentConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// "sqlite" or "memory"
    pub backend: String,
    pub path: String,
    /// Byte cap for the memory backend.
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: "sqlite".to_string(),
            path: "data/quire.db".to_string(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContentConfig {
    /// URL or file path of the post metadata document. When unset the
    /// embedded default posts are used.
    pub metadata: Option<String>,
    /// Base URL or directory that `contentFile` references resolve against.
    /// Defaults to the directory of `metadata`.
    pub content_base: Option<String>,
    pub fetch_timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            metadata: None,
            content_base: None,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
    pub default_author: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            timezone: "Asia/Shanghai".to_string(),
            date_format: "%Y/%-m/%-d".to_string(),
            time_format: "%H:%M:%S".to_string(),
            default_author: "Feng".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Config, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    /// Read `$QUIRE_CONFIG` or `quire.toml`. A missing file gives defaults;
    /// a malformed one is reported and also falls back to defaults.
    pub fn load() -> Config {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match std::fs::read_to_string(&path) {
            Ok(s) => match Self::from_toml_str(&s) {
                Ok(cfg) => {
                    info!("Loaded config from {}", path);
                    cfg
                }
                Err(e) => {
                    warn!("Invalid {}: {}, using defaults", path, e);
                    Config::default()
                }
            },
            Err(_) => {
                info!("{} not found, using default config", path);
                Config::default()
            }
        }
    }
}
