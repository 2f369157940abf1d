use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use log::info;

use crate::cell::BocOptions;
use crate::error::{CnftError, Result};

mod service;
mod source;

pub use service::ServiceConfig;
pub use source::SourceConfig;

/// Main configuration for the cNFT service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// BOC serialization flags
    pub boc: BocOptions,

    /// Record source configuration
    pub source: SourceConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .map_err(|e| CnftError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&config_str)
            .map_err(|e| CnftError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = self.to_toml()?;

        fs::write(path, config_str)
            .map_err(|e| CnftError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CnftError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Generate a default configuration file if it doesn't exist
    pub fn generate_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();

        if path.exists() {
            info!("Config file already exists at {:?}", path);
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CnftError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        Config::default().save(path)?;

        info!("Generated default config at {:?}", path);
        Ok(())
    }
}
