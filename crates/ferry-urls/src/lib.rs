//! Media URL providers for Ferry.
//!
//! The host content-rendering pipeline asks a [`MediaUrlProvider`] for the
//! URL of a media item. This crate provides:
//!
//! - [`MediaUrlProvider`]: the resolution capability the pipeline consumes
//! - [`UrlInfo`]: the tagged result - a URL with an associated culture, or
//!   a named route that downstream routing resolves (and decorators leave
//!   untouched)
//! - [`DefaultMediaUrlProvider`]: the plain strategy serving media from the
//!   host site itself
//! - [`CdnMediaUrlProvider`]: decorates another provider, optionally
//!   stripping the media root path and prefixing a CDN base URL, with both
//!   live-reloadable from configuration
//! - [`MediaPathResolver`] / [`SitePathResolver`]: absolutize
//!   `~/media`-style virtual paths against the site's application path

mod cdn;
mod paths;
mod provider;

pub use cdn::CdnMediaUrlProvider;
pub use paths::{MediaPathResolver, SitePathResolver};
pub use provider::{DefaultMediaUrlProvider, MediaContent, MediaUrlProvider, UrlInfo, UrlMode};

/// Errors from URL provider construction.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    /// A required collaborator or configuration was absent at construction.
    #[error("invalid URL provider configuration: {0}")]
    InvalidArgument(String),
}
