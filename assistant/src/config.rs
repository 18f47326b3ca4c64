use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ASSISTANT_NAME: &str = "Function_Caller";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_INSTRUCTIONS: &str = "You are a personal assistant that runs on the users command line. You call functions whenever needed.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings of the hosted assistant and the local tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assistant_name: String,
    pub model: String,
    pub instructions: String,
    /// Open-Meteo forecast snapshot backing `get_weather_for_location`.
    pub forecast_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant_name: DEFAULT_ASSISTANT_NAME.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            instructions: DEFAULT_INSTRUCTIONS.to_owned(),
            forecast_file: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the per-user config file if it
    /// exists. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            path => {
                tracing::debug!(config_path = ?path, "no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        // Relative snapshot paths are relative to the config file.
        if let (Some(file), Some(dir)) = (config.forecast_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "assistant")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
