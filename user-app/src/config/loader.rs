// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the tester's TOML file into a [`Config`]. A missing file is not an
//! error: the tester then runs against the default `/dev/s33drax`.

use super::model::{Config, ConfigError};
use std::{fs, path::Path};

/// Load, parse and validate the configuration at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    log::debug!("Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let cfg = parse(&txt)?;
    log::info!("Loaded config from {:?}", path);
    Ok(cfg)
}

/// Parse and validate configuration text.
pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(txt)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.logging.level_filter()?;

    let name = &cfg.device.name;
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(ConfigError::InvalidName(name.clone()));
    }
    if cfg.device.capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    Ok(())
}
