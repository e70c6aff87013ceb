//! Configuration management for Ferry.
//!
//! This crate provides the configuration plumbing shared by the storage
//! provider crates:
//!
//! - [`OptionsMonitor`]: named configuration snapshots with change
//!   notification, so components can rebuild live state when the
//!   configuration they were constructed from is replaced at runtime
//! - [`SwapCell`]: a concurrency-safe swappable cell for that live state,
//!   replaced wholesale by change listeners and loaded per operation
//! - The shared option types: [`BlobStoreOptions`], [`CdnOptions`] and
//!   [`MediaOptions`]
//! - [`FerryConfig`]: the `ferry.toml` loader with environment-variable
//!   expansion and validation
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `stores.<name>.connection_string`
//! - `cdn.url`

mod error;
mod expand;
mod file;
mod monitor;
mod options;
mod swap;

pub use error::ConfigError;
pub use file::{CONFIG_FILENAME, FerryConfig};
pub use monitor::{ChangeSubscription, DEFAULT_NAME, OptionsMonitor};
pub use options::{BlobStoreOptions, CdnOptions, MediaOptions};
pub use swap::SwapCell;
