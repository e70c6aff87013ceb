//! Blob-backed [`ImageCache`] implementation.
//!
//! [`BlobImageCache`] maps a cache key to a blob object path by prefixing a
//! virtual root folder, probes the backing container on `resolve`, and
//! uploads on `store`. The backing connection handle is held in a swappable
//! cell: when the named configuration the cache was built from changes, a
//! change listener rebuilds the handle, and subsequent operations pick it
//! up. In-flight operations keep the handle they loaded at their own call
//! time.

use std::sync::Arc;

use async_trait::async_trait;
use ferry_blob::{BlobConnector, BlobContainer, BlobError, BlobMetadata, BlobReader};
use ferry_config::{BlobStoreOptions, ChangeSubscription, OptionsMonitor, SwapCell};
use tokio::io::AsyncReadExt;

use crate::{CacheError, CacheResolver, ImageCache};

/// [`ImageCache`] storing derivatives in a blob container.
#[derive(Debug)]
pub struct BlobImageCache {
    container: Arc<SwapCell<dyn BlobContainer>>,
    root_path: Option<String>,
    _subscription: Option<ChangeSubscription<BlobStoreOptions>>,
}

impl BlobImageCache {
    /// Build a cache from a named, observable configuration.
    ///
    /// Resolves the options registered under `name`, connects through
    /// `connector`, and registers a change listener that rebuilds the
    /// connection handle whenever the options under the same name are
    /// replaced. Changes under other names are ignored. A rebuild that
    /// fails is logged and the previous handle stays live (a change
    /// listener has no caller to report to).
    ///
    /// The root path is taken from `root_path` if given, otherwise from
    /// the options at construction time; it is normalized once and never
    /// re-derived on configuration changes.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if no options are registered
    /// under `name`, or [`CacheError::Io`] if the initial connection fails.
    pub fn from_options(
        options: &OptionsMonitor<BlobStoreOptions>,
        name: &str,
        connector: Arc<dyn BlobConnector>,
        root_path: Option<&str>,
    ) -> Result<Self, CacheError> {
        let current = options.get(name).ok_or_else(|| {
            CacheError::InvalidArgument(format!("no blob store configuration named {name:?}"))
        })?;
        let cell = Arc::new(SwapCell::new(connector.connect(&current)?));
        let root_path = normalize_root_path(root_path.or(current.root_path.as_deref()));

        let watched_name = name.to_owned();
        let watched_cell = Arc::clone(&cell);
        let subscription = options.on_change(move |changed, changed_name| {
            if changed_name != watched_name {
                return;
            }
            match connector.connect(changed) {
                Ok(container) => {
                    watched_cell.store(container);
                    tracing::debug!("rebuilt blob container handle for store {changed_name:?}");
                }
                Err(err) => {
                    tracing::warn!(
                        "failed to rebuild blob container handle for store {changed_name:?}, \
                         keeping previous handle: {err}"
                    );
                }
            }
        });

        Ok(Self {
            container: cell,
            root_path,
            _subscription: Some(subscription),
        })
    }

    /// Build a cache over an already-constructed container handle.
    ///
    /// The handle is fixed for the lifetime of the cache; no configuration
    /// is observed.
    #[must_use]
    pub fn with_container(container: Arc<dyn BlobContainer>, root_path: Option<&str>) -> Self {
        Self {
            container: Arc::new(SwapCell::new(container)),
            root_path: normalize_root_path(root_path),
            _subscription: None,
        }
    }

    /// Effective object path for a cache key: root prefix + key, verbatim.
    fn entry_path(&self, key: &str) -> String {
        match &self.root_path {
            Some(root) => format!("{root}{key}"),
            None => key.to_owned(),
        }
    }
}

#[async_trait]
impl ImageCache for BlobImageCache {
    async fn resolve(&self, key: &str) -> Result<Option<Box<dyn CacheResolver>>, CacheError> {
        let path = self.entry_path(key);
        let container = self.container.load();
        if container.exists(&path).await? {
            Ok(Some(Box::new(BlobCacheResolver { container, path })))
        } else {
            Ok(None)
        }
    }

    async fn store(
        &self,
        key: &str,
        mut payload: BlobReader,
        metadata: BlobMetadata,
    ) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let mut data = Vec::new();
        payload
            .read_to_end(&mut data)
            .await
            .map_err(BlobError::io)?;
        let container = self.container.load();
        container.upload(&path, data, &metadata).await?;
        Ok(())
    }
}

/// Resolver over a single cache entry.
///
/// Holds the container handle that was live when the entry was resolved
/// and fetches bytes and metadata on demand.
#[derive(Debug)]
struct BlobCacheResolver {
    container: Arc<dyn BlobContainer>,
    path: String,
}

#[async_trait]
impl CacheResolver for BlobCacheResolver {
    async fn metadata(&self) -> Result<BlobMetadata, CacheError> {
        Ok(self.container.open(&self.path).await?.metadata)
    }

    async fn open(&self) -> Result<BlobReader, CacheError> {
        Ok(self.container.open(&self.path).await?.reader)
    }
}

/// Normalize a root path so a non-empty prefix always ends with `/`.
///
/// Empty input normalizes to no prefix; normalization is idempotent.
fn normalize_root_path(root: Option<&str>) -> Option<String> {
    let root = root?;
    if root.is_empty() {
        None
    } else if root.ends_with('/') {
        Some(root.to_owned())
    } else {
        Some(format!("{root}/"))
    }
}
