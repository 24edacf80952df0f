use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFailed(std::io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(String),
    #[error("no config path available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig { path: "upwatch.db".into() },
            probe: ProbeConfig {
                timeout_seconds: crate::monitoring::prober::DEFAULT_TIMEOUT_SECONDS,
            },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Configuration:")?;
        writeln!(f, "  Database")?;
        writeln!(f, "    Path: {}", self.database.path)?;
        writeln!(f, "  Probe")?;
        writeln!(f, "    Timeout: {}s", self.probe.timeout_seconds)?;
        Ok(())
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/upwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("upwatch/config.toml"))
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/upwatch/config.toml or the
    /// specified path, with the name config.toml, if one does not exist
    pub fn from_config(
        optional_path: Option<impl AsRef<path::Path>>,
    ) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string =
                fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            toml::from_str(raw_string.as_str())
                .map_err(|e| ConfigError::ParseFailed(e.to_string()))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }
}
