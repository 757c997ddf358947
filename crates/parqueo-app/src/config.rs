//! Configuration management for parqueo
//!
//! Config stored at: ~/.config/parqueo/config.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use parqueo_types::{ConfigError, OutputFormat, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OCR command to invoke (program plus fixed arguments)
    #[serde(default = "default_ocr_command")]
    pub ocr_command: String,

    /// Time box for one recognition search, in milliseconds
    #[serde(default = "default_recognition_timeout_ms")]
    pub recognition_timeout_ms: u64,

    /// How long a burst stays attachable for follow-up angles, in seconds
    #[serde(default = "default_burst_window_secs")]
    pub burst_window_secs: i64,

    /// Data directory override (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_ocr_command() -> String {
    "tesseract".to_string()
}

fn default_recognition_timeout_ms() -> u64 {
    10_000
}

fn default_burst_window_secs() -> i64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_command: default_ocr_command(),
            recognition_timeout_ms: default_recognition_timeout_ms(),
            burst_window_secs: default_burst_window_secs(),
            data_dir: None,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("parqueo");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        fs::write(Self::config_path()?, content)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Directory holding the JSON stores
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dir = dirs::data_dir().ok_or(ConfigError::NotFound)?.join("parqueo");
        Ok(dir)
    }

    /// Directory holding stored photo assets
    pub fn uploads_dir(&self) -> Result<PathBuf> {
        Ok(self.store_dir()?.join("uploads"))
    }
}
