// Application settings
// Loaded from ~/.config/orgrecon/config.toml

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use orgrecon_core::{ArrayMode, FeedSchema, ReconConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Published organisations concordance sheet.
pub const DEFAULT_CONCORDANCE_URL: &str =
    "https://bertha.ig.ft.com/view/publish/gss/1k7GHf3311hyLBsNgoocRRkHs7pIhJit0wQVReFfD_6w/orgs";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{0}")]
    Invalid(String),
    #[error("cannot serialise settings: {0}")]
    Serialize(String),
}

/// Concordance load retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Fixed delay between failed load attempts.
    pub retry_delay_secs: u64,
    /// 0 = retry forever
    pub max_attempts: u32,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            retry_delay_secs: 60,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub pool_max_idle_per_host: usize,
    pub tcp_keepalive_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            pool_max_idle_per_host: 128,
            tcp_keepalive_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    pub array_mode: ArrayMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Pipelines (record URL = base + uuid)
    pub composite_orgs_url: String,
    pub fs_transformer_url: String,

    // Concordance feed
    pub concordance_url: String,
    pub concordance_schema: FeedSchema,

    /// Reserved for the admin endpoint; only logged.
    pub port: u16,

    pub load: LoadSettings,
    pub http: HttpSettings,
    pub compare: CompareSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            composite_orgs_url: String::new(),
            fs_transformer_url: String::new(),
            concordance_url: DEFAULT_CONCORDANCE_URL.to_string(),
            concordance_schema: FeedSchema::default(),
            port: DEFAULT_PORT,
            load: LoadSettings::default(),
            http: HttpSettings::default(),
            compare: CompareSettings::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orgrecon")
            .join("config.toml")
    }

    /// Load from the default path. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Reject settings a run cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("composite_orgs_url", &self.composite_orgs_url)?;
        check_url("fs_transformer_url", &self.fs_transformer_url)?;
        self.validate_feed()
    }

    /// The subset needed to load the concordance alone.
    pub fn validate_feed(&self) -> Result<(), ConfigError> {
        check_url("concordance_url", &self.concordance_url)?;
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn recon_config(&self) -> ReconConfig {
        ReconConfig::new(&self.composite_orgs_url, &self.fs_transformer_url)
            .with_array_mode(self.compare.array_mode)
    }
}

fn check_url(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{name} must be set")));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Invalid(format!(
            "{name} must be an http(s) URL, got \"{value}\""
        )));
    }
    Ok(())
}
