//! Configuration management for flowshare
//!
//! Config stored at: ~/.config/flowshare/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use flowshare_domain::service::anomaly_detector::{DEFAULT_HISTORY_WINDOW, DEFAULT_Z_THRESHOLD};
use flowshare_types::{ConfigError, OutputFormat, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Data directory override for the JSON stores
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when neither FLOWSHARE_LOG nor --verbose is given
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// TOML file with per-tenant settings
    #[serde(default)]
    pub tenant_settings_path: Option<PathBuf>,

    /// z-score above which an entry is flagged
    #[serde(default = "default_z_threshold")]
    pub anomaly_z_threshold: f64,

    /// Number of historical validated entries compared against
    #[serde(default = "default_history_window")]
    pub anomaly_history_window: usize,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_z_threshold() -> f64 {
    DEFAULT_Z_THRESHOLD
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            data_dir: None,
            log_level: default_log_level(),
            tenant_settings_path: None,
            anomaly_z_threshold: default_z_threshold(),
            anomaly_history_window: default_history_window(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("flowshare");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Directory holding the entry and reconciliation stores
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("flowshare");
        Ok(data_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FlowShare Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Output format:        {}", self.output_format)?;
        writeln!(
            f,
            "Data dir:             {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Log level:            {}", self.log_level)?;
        writeln!(
            f,
            "Tenant settings:      {}",
            self.tenant_settings_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string())
        )?;
        writeln!(f, "Anomaly z-threshold:  {}", self.anomaly_z_threshold)?;
        writeln!(f, "Anomaly history:      {}", self.anomaly_history_window)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:          {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"output_format":"json"}"#).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.anomaly_z_threshold, 2.0);
        assert_eq!(config.anomaly_history_window, 10);
        assert!(config.tenant_settings_path.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            anomaly_z_threshold: 3.0,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.data_dir().unwrap(), dir.path().join("data"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(flowshare_types::Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
