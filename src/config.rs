use crate::catalog::{CatalogError, StaticCatalog};
use crate::domain::Cutoff;
use crate::orchestration::DEFAULT_MAX_SESSIONS;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// JSON file mapping project ids to feed source ids.
    pub catalog_path: Option<String>,
    /// Cutoff applied when a request does not carry its own.
    pub default_cutoff: Cutoff,
    /// Upper bound on live recompute sessions.
    pub max_sessions: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let catalog_path = env_map
            .get("CATALOG_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let cutoff_kind = env_map
            .get("DEFAULT_CUTOFF_KIND")
            .map(|s| s.as_str())
            .unwrap_or("absolute");
        let cutoff_value = env_map
            .get("DEFAULT_CUTOFF_VALUE")
            .map(|s| s.as_str())
            .unwrap_or("0");
        let default_cutoff = Cutoff::parse(cutoff_kind, cutoff_value).map_err(|e| {
            ConfigError::InvalidValue("DEFAULT_CUTOFF".to_string(), e.to_string())
        })?;

        let max_sessions = match env_map.get("MAX_SESSIONS") {
            Some(s) => s.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_SESSIONS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?,
            None => DEFAULT_MAX_SESSIONS,
        };

        Ok(Config {
            port,
            catalog_path,
            default_cutoff,
            max_sessions,
        })
    }

    /// Load the feed catalog; an unset path yields an empty catalog.
    pub fn load_catalog(&self) -> Result<StaticCatalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => StaticCatalog::from_json_file(path),
            None => Ok(StaticCatalog::default()),
        }
    }
}
