// src/config.rs

//! Configuration loading for the serverless deployment.

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::s3::S3Storage;

/// Loads `config.toml` from the deployment bucket.
pub struct S3ConfigLoader {
    storage: S3Storage,
    prefix: String,
}

impl S3ConfigLoader {
    pub fn new(storage: S3Storage, config_prefix: &str) -> Self {
        Self {
            storage,
            prefix: config_prefix.trim_matches('/').to_string(),
        }
    }

    /// Loader using `CONFIG_S3_PREFIX`, defaulting to `{S3_PREFIX}/config`.
    pub fn from_env(storage: S3Storage) -> Self {
        let prefix = std::env::var("CONFIG_S3_PREFIX").unwrap_or_else(|_| {
            let trimmed = storage.prefix().trim_matches('/');
            if trimmed.is_empty() {
                "config".to_string()
            } else {
                format!("{}/config", trimmed)
            }
        });
        Self::new(storage, &prefix)
    }

    /// Load the configuration, using defaults when no file was uploaded.
    ///
    /// Environment overrides are applied either way.
    pub async fn load_config(&self) -> Result<Config> {
        let key = format!("{}/config.toml", self.prefix);
        log::info!("Loading config file from S3: {}", key);

        let mut config = match self.storage.read_bytes_optional(&key).await? {
            Some(bytes) => {
                let s = String::from_utf8(bytes).map_err(|e| {
                    AppError::config(format!("Config file {} is not valid UTF-8: {}", key, e))
                })?;
                Config::from_toml(&s)?
            }
            None => {
                log::info!("No config at {}, using defaults", key);
                Config::default()
            }
        };
        config.apply_env();
        Ok(config)
    }
}
