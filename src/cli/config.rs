// ABOUTME: Configuration management for the digkit application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "http://localhost:65432";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                serde_yaml::from_str(&contents)?
            }
            _ => Config::default(),
        };

        config.merge_env();
        Ok(config)
    }

    /// Find configuration file in the working directory, then the home directory
    fn find_config_file() -> Option<PathBuf> {
        let possible_paths = ["digkit.yaml", "digkit.yml", ".digkit.yaml", ".digkit.yml"];

        if let Some(path) = possible_paths
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
        {
            return Some(path);
        }

        dirs::home_dir()
            .map(|home| home.join(".digkit").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) {
        if let Ok(host) = std::env::var("DIGKIT_HOST") {
            self.host = host;
        }
        if let Ok(level) = std::env::var("DIGKIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DIGKIT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// A host given on the command line wins over file and environment
    pub fn override_host(&mut self, host: Option<String>) {
        if let Some(host) = host {
            self.host = host;
        }
    }
}
