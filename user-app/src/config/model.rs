// src/config/model.rs

use log::LevelFilter;
use s33drax::DriverConfig;
use serde::Deserialize;
use shared::constants::{BUF_LENGTH, DEV_DIR, DEVICE_NAME};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)] pub logging: LoggingConfig,
    #[serde(default)] pub device:  DeviceConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

impl LoggingConfig {
    /// `level` as a filter; validated by the loader.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidLevel(self.level.clone()))
    }
}

/// Mirror of the `[device]` table
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_name")]     pub name:     String,
    #[serde(default = "default_capacity")] pub capacity: usize,
}
fn default_name() -> String { DEVICE_NAME.into() }
fn default_capacity() -> usize { BUF_LENGTH }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { name: default_name(), capacity: default_capacity() }
    }
}

impl DeviceConfig {
    /// Node the driver publishes for this device.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(DEV_DIR).join(&self.name)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig { name: self.name.clone(), capacity: self.capacity }
    }
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("device name must be a single non-empty path component, got '{0}'")]
    InvalidName(String),

    #[error("device capacity must be at least 1 byte")]
    ZeroCapacity,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
