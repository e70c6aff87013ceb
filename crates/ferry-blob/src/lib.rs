//! Blob container abstraction for Ferry.
//!
//! This crate provides the seam between the storage provider components and
//! the cloud blob SDK:
//!
//! - [`BlobContainer`]: the three operations the providers consume from a
//!   storage container (existence probe, upload, open for reading)
//! - [`BlobConnector`]: builds container handles from
//!   [`BlobStoreOptions`](ferry_config::BlobStoreOptions), so consumers can
//!   rebuild their handle when configuration changes at runtime
//! - [`BlobError`]: semantic error categories over backend-specific failures
//! - [`MemoryContainer`] / [`MemoryConnector`]: in-memory test doubles
//!   (behind the `mock` feature)
//!
//! Backends live in their own crates (e.g. `ferry-blob-s3`); this crate
//! carries no SDK dependency.

mod container;
mod error;
#[cfg(any(test, feature = "mock"))]
mod memory;

pub use container::{BlobConnector, BlobContainer, BlobDownload, BlobMetadata, BlobReader};
pub use error::{BlobError, BlobErrorKind};
#[cfg(any(test, feature = "mock"))]
pub use memory::{MemoryConnector, MemoryContainer};
