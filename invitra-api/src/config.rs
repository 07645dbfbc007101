//! Configuration loading for the Invitra relay.
//!
//! The file path comes from `--config <path>` or `INVITRA_CONFIG`. Every
//! field is required except `backend.api_key` and the `[dedup]` timings,
//! which fall back to the production constants.

use invitra_core::{ConfigError, DEBOUNCE_WINDOW, DEFAULT_SWEEP_INTERVAL, SAVE_TIMEOUT};
use invitra_drafts::{BackendSettings, DedupConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "INVITRA_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub backend: BackendConfig,
    #[serde(default)]
    pub dedup: DedupTimings,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub base_url: String,
    pub save_path: String,
    pub load_path: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("save_path", &self.save_path)
            .field("load_path", &self.load_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DedupTimings {
    pub debounce_window_ms: u64,
    pub save_timeout_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for DedupTimings {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEBOUNCE_WINDOW.as_millis() as u64,
            save_timeout_ms: SAVE_TIMEOUT.as_millis() as u64,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL.as_millis() as u64,
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.backend.save_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.save_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.backend.load_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.load_path",
                reason: "must not be empty".to_string(),
            });
        }
        if matches!(&self.backend.api_key, Some(key) if key.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "backend.api_key",
                reason: "must not be empty when set".to_string(),
            });
        }
        if self.dedup.debounce_window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dedup.debounce_window_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.dedup.save_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dedup.save_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.dedup.sweep_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dedup.sweep_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "bind_addr",
                reason: e.to_string(),
            })
    }

    /// Settings for the outbound client. The transport timeout matches the
    /// save timeout so reqwest never outlives the dedup layer's bound.
    pub fn backend_settings(&self) -> BackendSettings {
        let settings = BackendSettings::new(self.backend.base_url.trim())
            .with_paths(&self.backend.save_path, &self.backend.load_path)
            .with_timeout(Duration::from_millis(self.dedup.save_timeout_ms));
        match &self.backend.api_key {
            Some(key) => settings.with_api_key(key.clone()),
            None => settings,
        }
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig::new()
            .with_debounce_window(Duration::from_millis(self.dedup.debounce_window_ms))
            .with_save_timeout(Duration::from_millis(self.dedup.save_timeout_ms))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.dedup.sweep_interval_ms)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
