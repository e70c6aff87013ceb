//! In-memory container implementation for testing.
//!
//! Provides [`MemoryContainer`] and [`MemoryConnector`] for unit testing
//! without network access. The connector hands out one container per
//! distinct connection settings, so tests can observe which "store" a
//! consumer talks to before and after a configuration change.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use ferry_config::BlobStoreOptions;

use crate::container::{BlobConnector, BlobContainer, BlobDownload, BlobMetadata};
use crate::error::{BlobError, BlobErrorKind};

#[derive(Clone, Debug)]
struct StoredObject {
    data: Vec<u8>,
    metadata: BlobMetadata,
}

/// In-memory [`BlobContainer`] for testing.
///
/// Objects live in a map guarded by a lock; a failure kind can be injected
/// to make every operation fail, for testing error propagation.
///
/// # Example
///
/// ```ignore
/// use ferry_blob::{BlobContainer, MemoryContainer};
///
/// let container = MemoryContainer::new()
///     .with_object("cache/abc", b"bytes".to_vec(), BlobMetadata::new());
/// assert!(container.exists("cache/abc").await.unwrap());
/// ```
#[derive(Default, Debug)]
pub struct MemoryContainer {
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_with: RwLock<Option<BlobErrorKind>>,
}

impl MemoryContainer {
    /// Create a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (builder form).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_object(
        self,
        path: impl Into<String>,
        data: Vec<u8>,
        metadata: BlobMetadata,
    ) -> Self {
        self.objects
            .write()
            .unwrap()
            .insert(path.into(), StoredObject { data, metadata });
        self
    }

    /// Make every subsequent operation fail with the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_with(&self, kind: BlobErrorKind) {
        *self.fail_with.write().unwrap() = Some(kind);
    }

    /// Clear an injected failure.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_failure(&self) {
        *self.fail_with.write().unwrap() = None;
    }

    /// True if an object exists at `path` (synchronous test helper).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.objects.read().unwrap().contains_key(path)
    }

    /// Number of stored objects.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// All stored object paths, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn check_failure(&self, path: &str) -> Result<(), BlobError> {
        if let Some(kind) = *self.fail_with.read().unwrap() {
            return Err(BlobError::new(kind)
                .with_backend("Memory")
                .with_path(path));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobContainer for MemoryContainer {
    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        self.check_failure(path)?;
        Ok(self.objects.read().unwrap().contains_key(path))
    }

    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: &BlobMetadata,
    ) -> Result<(), BlobError> {
        self.check_failure(path)?;
        self.objects.write().unwrap().insert(
            path.to_owned(),
            StoredObject {
                data,
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    async fn open(&self, path: &str) -> Result<BlobDownload, BlobError> {
        self.check_failure(path)?;
        let object = self
            .objects
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::not_found(path).with_backend("Memory"))?;
        Ok(BlobDownload {
            metadata: object.metadata,
            reader: Box::new(std::io::Cursor::new(object.data)),
        })
    }
}

/// In-memory [`BlobConnector`] for testing.
///
/// Hands out one [`MemoryContainer`] per distinct
/// `(connection_string, container)` pair, and counts connect calls, so
/// tests can assert that a consumer rebuilt its handle after a
/// configuration change and which store it now writes to.
#[derive(Default)]
pub struct MemoryConnector {
    containers: RwLock<HashMap<String, Arc<MemoryContainer>>>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    /// Create a new connector with no containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the container for the given connection settings.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn container_for(&self, options: &BlobStoreOptions) -> Arc<MemoryContainer> {
        let key = format!("{}::{}", options.connection_string, options.container);
        Arc::clone(
            self.containers
                .write()
                .unwrap()
                .entry(key)
                .or_insert_with(|| Arc::new(MemoryContainer::new())),
        )
    }

    /// Number of connect calls made through this connector.
    #[must_use]
    pub fn connections(&self) -> usize {
        self.connects.load(Ordering::Relaxed)
    }
}

impl BlobConnector for MemoryConnector {
    fn connect(&self, options: &BlobStoreOptions) -> Result<Arc<dyn BlobContainer>, BlobError> {
        self.connects.fetch_add(1, Ordering::Relaxed);
        Ok(self.container_for(options))
    }
}
