//! Option types shared by the storage provider crates.

use serde::Deserialize;

use crate::ConfigError;

/// Connection settings for a named blob store.
///
/// A store is addressed by the name it was registered under in an
/// [`OptionsMonitor`](crate::OptionsMonitor); replacing the snapshot under
/// that name makes consumers rebuild their connection handles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlobStoreOptions {
    /// Backend connection string: `key=value` pairs separated by `;`.
    ///
    /// The accepted keys are backend-specific; see the backend crate.
    pub connection_string: String,
    /// Container (bucket) holding the objects.
    pub container: String,
    /// Optional virtual root folder for all objects stored through this
    /// configuration.
    pub root_path: Option<String>,
}

impl BlobStoreOptions {
    /// Validate required fields, reporting errors under the `context` field
    /// path (e.g. `stores.media`).
    pub fn validate(&self, context: &str) -> Result<(), ConfigError> {
        require_non_empty(&self.connection_string, &format!("{context}.connection_string"))?;
        require_non_empty(&self.container, &format!("{context}.container"))?;
        Ok(())
    }
}

/// Options governing CDN URL rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CdnOptions {
    /// CDN base URL prepended to media URLs.
    pub url: String,
    /// Strip the media root path from the URL before prefixing, so the CDN
    /// serves objects by their container-relative path.
    pub remove_media_from_path: bool,
}

impl Default for CdnOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            remove_media_from_path: true,
        }
    }
}

impl CdnOptions {
    /// Validate the CDN URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.url, "cdn.url")?;
        require_http_url(&self.url, "cdn.url")?;
        Ok(())
    }
}

/// Options locating the media root of the host site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaOptions {
    /// Virtual path of the media root (e.g. `~/media`).
    pub media_path: String,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            media_path: "~/media".to_owned(),
        }
    }
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub(crate) fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must be an http:// or https:// URL, got {url:?}"
        )));
    }
    Ok(())
}
