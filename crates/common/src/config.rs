//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default motion detection settings.
    pub detection: DetectionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default motion detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionDefaults {
    /// Sensitivity level: "low", "medium" or "high".
    pub sensitivity: String,

    /// Whether high-intensity motion raises auto-wake events.
    pub auto_wake: bool,

    /// Delay between the end of one sample and the start of the next.
    pub tick_interval_ms: u64,

    /// Upper bound on the analysed frame width.
    pub max_width: u32,

    /// Upper bound on the analysed frame height.
    pub max_height: u32,

    /// Preferred camera frame rate.
    pub ideal_fps: u32,

    /// How long to wait for the camera to report a stable geometry.
    pub open_timeout_ms: u64,

    /// Explicit camera device (e.g. "/dev/video2"). Auto-detected when unset.
    pub device: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "wakesight=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for DetectionDefaults {
    fn default() -> Self {
        Self {
            sensitivity: "medium".to_string(),
            auto_wake: true,
            tick_interval_ms: 200,
            max_width: 320,
            max_height: 240,
            ideal_fps: 15,
            open_timeout_ms: 5_000,
            device: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match Self::from_json(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Parse a config document. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("wakesight").join("config.json")
}
