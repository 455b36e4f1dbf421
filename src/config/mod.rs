// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::Result;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment overrides, e.g. `PACKMAN_LOGGER__LEVEL=DEBUG`.
pub const ENV_PREFIX: &str = "PACKMAN";

impl AppConfig {
    /// Load configuration with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file (`path`, or `~/.packman/config.toml` when `None`)
    /// 3. Defaults (lowest)
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    pub(crate) fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(environment)
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.diagnostics.validate()?;
        debug!("Loaded configuration: {:?}", loaded);
        Ok(loaded)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".packman")
            .join("config.toml")
    }
}
