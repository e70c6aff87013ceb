//! Image derivative cache for Ferry.
//!
//! The host image pipeline caches processed derivatives (resizes, crops,
//! format conversions) under opaque keys. This crate provides the cache
//! contract it consumes and a blob-backed implementation:
//!
//! - [`ImageCache`]: the get/set cache contract ([`resolve`](ImageCache::resolve) /
//!   [`store`](ImageCache::store))
//! - [`CacheResolver`]: handed back on a cache hit; streams the entry's
//!   bytes and stored metadata on demand
//! - [`BlobImageCache`]: stores entries in a blob container under a virtual
//!   root folder, with a live-reloadable backing connection
//! - [`NullImageCache`]: no-op implementation (always misses)
//!
//! "Entry not found" is a normal outcome for `resolve`, not an error; any
//! backing-store failure surfaces unchanged as [`CacheError::Io`].

mod blob;

use async_trait::async_trait;
use ferry_blob::{BlobError, BlobMetadata, BlobReader};

pub use blob::BlobImageCache;

/// Errors from cache construction and operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A required collaborator or named configuration was absent at
    /// construction.
    #[error("invalid cache configuration: {0}")]
    InvalidArgument(String),
    /// Backing store failure, surfaced unchanged.
    #[error(transparent)]
    Io(#[from] BlobError),
}

/// Cache contract consumed by the image pipeline.
///
/// Keys are opaque strings chosen by the pipeline (typically a hash of the
/// request parameters) and are expected to be filesystem-safe; they are
/// used in object paths without further escaping.
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Look up a cached entry.
    ///
    /// Returns `Ok(None)` when no entry exists for `key`; that is a normal
    /// cache miss, not an error. On a hit, the returned resolver reads the
    /// entry's bytes and metadata on demand.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the existence probe itself fails.
    async fn resolve(&self, key: &str) -> Result<Option<Box<dyn CacheResolver>>, CacheError>;

    /// Store an entry, overwriting any previous entry for the same key.
    ///
    /// The metadata mapping is persisted with the entry and returned
    /// verbatim by a later [`resolve`](Self::resolve).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if reading the payload or uploading fails.
    async fn store(
        &self,
        key: &str,
        payload: BlobReader,
        metadata: BlobMetadata,
    ) -> Result<(), CacheError>;
}

/// A resolved cache entry.
///
/// Produced by [`ImageCache::resolve`] on a hit; the consumer reads the
/// byte stream and the stored metadata when it needs them.
#[async_trait]
pub trait CacheResolver: Send + Sync + std::fmt::Debug {
    /// The metadata stored with the entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if fetching the entry fails.
    async fn metadata(&self) -> Result<BlobMetadata, CacheError>;

    /// Open the entry's payload for reading.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if fetching the entry fails.
    async fn open(&self) -> Result<BlobReader, CacheError>;
}

/// No-op [`ImageCache`] that never stores or retrieves entries.
///
/// Every `resolve` misses; every `store` is silently discarded. Use when
/// derivative caching is disabled.
pub struct NullImageCache;

#[async_trait]
impl ImageCache for NullImageCache {
    async fn resolve(&self, _key: &str) -> Result<Option<Box<dyn CacheResolver>>, CacheError> {
        Ok(None)
    }

    async fn store(
        &self,
        _key: &str,
        _payload: BlobReader,
        _metadata: BlobMetadata,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}
