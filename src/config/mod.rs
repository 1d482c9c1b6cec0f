use std::collections::BTreeMap;
use std::env;

use thiserror::Error;

use crate::session::SessionConfig;

/// Named probe targets. A BTreeMap so the CLI runs them in a stable order.
pub type Config = BTreeMap<String, SessionConfig>;

const DEFAULT_CONFIG_FILE: &str = "panelprobe.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Loads the target map from the YAML file named by the `CONFIG_FILE`
/// environment variable, falling back to `panelprobe.yml`.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    load_config_file(&path)
}

pub fn load_config_file(path: &str) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_string(),
        source,
    })?;
    Ok(config)
}
