//! Container trait and associated types.
//!
//! # Object Path Convention
//!
//! All path parameters are container-relative object paths with `/`
//! separators and no leading separator (e.g. `cache/abc123`). Containers
//! store objects under the path exactly as given; callers are responsible
//! for supplying filesystem-safe path segments.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ferry_config::BlobStoreOptions;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::BlobError;

/// Metadata stored alongside an object: an ordered string-to-string mapping.
///
/// Carries cache bookkeeping such as source timestamps and content types;
/// containers must persist and return every entry unchanged.
pub type BlobMetadata = BTreeMap<String, String>;

/// Byte stream over an object's payload.
pub type BlobReader = Box<dyn AsyncRead + Send + Unpin>;

/// A downloaded object: its stored metadata and a reader over its bytes.
pub struct BlobDownload {
    /// Metadata stored with the object.
    pub metadata: BlobMetadata,
    /// Reader over the object's payload.
    pub reader: BlobReader,
}

impl std::fmt::Debug for BlobDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobDownload")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl BlobDownload {
    /// Read the full payload into memory.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] if the stream fails mid-read.
    pub async fn into_bytes(mut self) -> Result<Vec<u8>, BlobError> {
        let mut data = Vec::new();
        self.reader
            .read_to_end(&mut data)
            .await
            .map_err(BlobError::io)?;
        Ok(data)
    }
}

/// A connection handle to a blob storage container.
///
/// These are the only operations the storage providers consume. All three
/// may suspend pending network I/O; none retries, and every backend failure
/// propagates unchanged as [`BlobError`].
#[async_trait]
pub trait BlobContainer: Send + Sync + std::fmt::Debug {
    /// Check whether an object exists at `path`.
    ///
    /// A missing object is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] if the probe itself fails (auth, transport).
    async fn exists(&self, path: &str) -> Result<bool, BlobError>;

    /// Upload `data` to `path` with the given metadata, overwriting any
    /// existing object at that path.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] if the upload fails.
    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: &BlobMetadata,
    ) -> Result<(), BlobError>;

    /// Open the object at `path` for reading, returning its stored metadata
    /// and a reader over its bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`BlobError`] with kind
    /// [`NotFound`](crate::BlobErrorKind::NotFound) if no object exists at
    /// `path`, or another kind if the download fails.
    async fn open(&self, path: &str) -> Result<BlobDownload, BlobError>;
}

/// Builds container handles from connection settings.
///
/// This is the seam that lets a consumer rebuild its handle when the
/// configuration it was constructed from changes at runtime: the consumer
/// keeps the connector and calls [`connect`](Self::connect) again with the
/// new options.
pub trait BlobConnector: Send + Sync {
    /// Build a container handle for the given connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] with kind
    /// [`InvalidConfig`](crate::BlobErrorKind::InvalidConfig) if the
    /// connection string is malformed or incomplete.
    fn connect(&self, options: &BlobStoreOptions) -> Result<Arc<dyn BlobContainer>, BlobError>;
}
