//! Configuration loading.
//!
//! Settings come from an optional TOML file merged with `DRIVESPACE_*`
//! environment overrides; everything has a default so a bare deployment
//! needs no configuration at all.

use crate::logging::LoggingConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persistence collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Endpoint holding the whole namespace document (GET/PUT)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "http://localhost:3001/driveWebData".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            endpoint: default_endpoint(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional file plus the environment.
    ///
    /// Environment variables use the `DRIVESPACE_` prefix with `__` as the
    /// section separator, e.g. `DRIVESPACE_PERSISTENCE__ENDPOINT`.
    pub fn load(file: Option<&Path>) -> Result<DriveConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("DRIVESPACE").separator("__"));
        builder.build()?.try_deserialize()
    }

    /// Create default configuration.
    pub fn default() -> DriveConfig {
        DriveConfig::default()
    }
}
