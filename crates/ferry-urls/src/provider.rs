//! Media URL resolution contract.

use url::Url;
use uuid::Uuid;

/// How a resolved URL should be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlMode {
    /// Use the site default.
    #[default]
    Default,
    /// Site-relative URL.
    Relative,
    /// Absolute URL including scheme and host.
    Absolute,
    /// Pick relative or absolute based on the current request.
    Auto,
}

/// The media item whose URL is being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContent {
    /// Content key.
    pub key: Uuid,
    /// Site-relative path of the stored media file
    /// (e.g. `/media/1001/photo.jpg`).
    pub path: String,
}

impl MediaContent {
    /// Create a media content item.
    #[must_use]
    pub fn new(key: Uuid, path: impl Into<String>) -> Self {
        Self {
            key,
            path: path.into(),
        }
    }
}

/// Result of media URL resolution.
///
/// Either a resolvable URL, or a named route that downstream routing turns
/// into a URL later. Decorators rewrite URLs only; routes pass through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInfo {
    /// A resolvable URL.
    Url {
        /// The URL text.
        url: String,
        /// Culture the URL was resolved for.
        culture: Option<String>,
    },
    /// A named route.
    Route {
        /// The route name.
        route: String,
        /// Culture the route was resolved for.
        culture: Option<String>,
    },
}

impl UrlInfo {
    /// Create a URL result.
    #[must_use]
    pub fn url(url: impl Into<String>, culture: Option<&str>) -> Self {
        Self::Url {
            url: url.into(),
            culture: culture.map(str::to_owned),
        }
    }

    /// Create a route result.
    #[must_use]
    pub fn route(route: impl Into<String>, culture: Option<&str>) -> Self {
        Self::Route {
            route: route.into(),
            culture: culture.map(str::to_owned),
        }
    }

    /// True if this is a genuine URL (not a route).
    #[must_use]
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url { .. })
    }

    /// The URL or route text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Url { url, .. } => url,
            Self::Route { route, .. } => route,
        }
    }

    /// The culture tag, if any.
    #[must_use]
    pub fn culture(&self) -> Option<&str> {
        match self {
            Self::Url { culture, .. } | Self::Route { culture, .. } => culture.as_deref(),
        }
    }
}

/// Capability: resolve the URL of a media item.
///
/// Implementations are polymorphic over this single operation; the host
/// pipeline holds providers as `Arc<dyn MediaUrlProvider>` and composes
/// decorators around the default strategy.
pub trait MediaUrlProvider: Send + Sync {
    /// Resolve the URL for the `property_alias` property of `content`.
    ///
    /// Returns `None` when this provider cannot produce a URL for the item.
    fn media_url(
        &self,
        content: &MediaContent,
        property_alias: &str,
        mode: UrlMode,
        culture: Option<&str>,
        current: &Url,
    ) -> Option<UrlInfo>;
}

/// Default resolution strategy: serves media from the host site itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMediaUrlProvider;

impl MediaUrlProvider for DefaultMediaUrlProvider {
    fn media_url(
        &self,
        content: &MediaContent,
        _property_alias: &str,
        mode: UrlMode,
        culture: Option<&str>,
        current: &Url,
    ) -> Option<UrlInfo> {
        let path = content.path.trim();
        if path.is_empty() {
            return None;
        }
        match mode {
            UrlMode::Absolute => {
                let absolute = current.join(path).ok()?;
                Some(UrlInfo::url(String::from(absolute), culture))
            }
            // Media paths are site-relative, so Auto resolves like Relative
            UrlMode::Default | UrlMode::Relative | UrlMode::Auto => {
                Some(UrlInfo::url(path, culture))
            }
        }
    }
}
