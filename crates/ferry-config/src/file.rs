//! `ferry.toml` loading.
//!
//! A configuration file declares any number of named blob stores plus the
//! CDN and media-root settings:
//!
//! ```toml
//! [stores.media]
//! connection_string = "endpoint=https://s3.example.com;region=us-east-1;access_key=${S3_KEY};secret_key=${S3_SECRET}"
//! container = "media"
//! root_path = "cache"
//!
//! [cdn]
//! url = "https://cdn.example.com"
//! remove_media_from_path = true
//!
//! [media]
//! media_path = "~/media"
//! ```
//!
//! Loading expands environment variables, validates the result, and can seed
//! [`OptionsMonitor`]s for the consuming components.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::monitor::OptionsMonitor;
use crate::options::{BlobStoreOptions, CdnOptions, MediaOptions};
use crate::{ConfigError, expand};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "ferry.toml";

/// Parsed `ferry.toml` configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FerryConfig {
    /// Named blob stores (`[stores.<name>]` sections).
    pub stores: BTreeMap<String, BlobStoreOptions>,
    /// CDN URL rewriting options.
    pub cdn: CdnOptions,
    /// Media root options.
    pub media: MediaOptions,
}

impl FerryConfig {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, fails to
    /// parse, references unset environment variables, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on parse, expansion, or validation failure.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (name, store) in &mut self.stores {
            store.connection_string = expand::expand_env(
                &store.connection_string,
                &format!("stores.{name}.connection_string"),
            )?;
        }
        if !self.cdn.url.is_empty() {
            self.cdn.url = expand::expand_env(&self.cdn.url, "cdn.url")?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Every declared store must carry a connection string and container.
    /// The `[cdn]` section is optional; when a URL is set it must be HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any check fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, store) in &self.stores {
            store.validate(&format!("stores.{name}"))?;
        }
        if !self.cdn.url.is_empty() {
            self.cdn.validate()?;
        }
        Ok(())
    }

    /// Build a monitor seeded with every declared store, keyed by name.
    #[must_use]
    pub fn store_monitor(&self) -> OptionsMonitor<BlobStoreOptions> {
        let mut monitor = OptionsMonitor::new();
        for (name, store) in &self.stores {
            monitor = monitor.with_named(name.clone(), store.clone());
        }
        monitor
    }

    /// Build a monitor carrying the CDN options under the default name.
    #[must_use]
    pub fn cdn_monitor(&self) -> OptionsMonitor<CdnOptions> {
        OptionsMonitor::with_default(self.cdn.clone())
    }

    /// Build a monitor carrying the media options under the default name.
    #[must_use]
    pub fn media_monitor(&self) -> OptionsMonitor<MediaOptions> {
        OptionsMonitor::with_default(self.media.clone())
    }
}
