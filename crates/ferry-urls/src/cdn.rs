//! CDN-decorated media URL provider.
//!
//! [`CdnMediaUrlProvider`] wraps another [`MediaUrlProvider`], resolves the
//! media URL in relative mode, optionally strips the media root path, and
//! prefixes the CDN base URL. The CDN URL, the strip flag, and the media
//! root are each live-reloadable from their own configuration source; each
//! is swapped wholesale, so an operation sees either the old or the new
//! value of a field, never a partial update.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ferry_config::{
    CdnOptions, ChangeSubscription, DEFAULT_NAME, MediaOptions, OptionsMonitor, SwapCell,
};
use url::Url;

use crate::UrlError;
use crate::paths::MediaPathResolver;
use crate::provider::{MediaContent, MediaUrlProvider, UrlInfo, UrlMode};

/// [`MediaUrlProvider`] that rewrites resolved media URLs onto a CDN host.
pub struct CdnMediaUrlProvider {
    inner: Arc<dyn MediaUrlProvider>,
    cdn_url: Arc<SwapCell<str>>,
    strip_media_path: Arc<AtomicBool>,
    media_path: Arc<SwapCell<str>>,
    _cdn_subscription: ChangeSubscription<CdnOptions>,
    _media_subscription: ChangeSubscription<MediaOptions>,
}

impl CdnMediaUrlProvider {
    /// Wrap `inner` with CDN rewriting.
    ///
    /// Reads the CDN options and the media options eagerly from the default
    /// name of their monitors, then watches both; each listener recomputes
    /// only the values its source governs, and only for the default name.
    /// The media root is absolutized through `paths` both eagerly and on
    /// every change.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::InvalidArgument`] if either monitor has no value
    /// under the default name, or the configured CDN URL is empty.
    pub fn new(
        inner: Arc<dyn MediaUrlProvider>,
        cdn_options: &OptionsMonitor<CdnOptions>,
        media_options: &OptionsMonitor<MediaOptions>,
        paths: Arc<dyn MediaPathResolver>,
    ) -> Result<Self, UrlError> {
        let cdn = cdn_options.current().ok_or_else(|| {
            UrlError::InvalidArgument("no CDN options under the default name".to_owned())
        })?;
        let media = media_options.current().ok_or_else(|| {
            UrlError::InvalidArgument("no media options under the default name".to_owned())
        })?;
        if cdn.url.is_empty() {
            return Err(UrlError::InvalidArgument("CDN URL is empty".to_owned()));
        }

        let cdn_url = Arc::new(SwapCell::new(normalize_cdn_url(&cdn.url)));
        let strip_media_path = Arc::new(AtomicBool::new(cdn.remove_media_from_path));
        let media_path = Arc::new(SwapCell::new(normalize_media_path(
            &paths.to_absolute(&media.media_path),
        )));

        let watched_cdn = Arc::clone(&cdn_url);
        let watched_strip = Arc::clone(&strip_media_path);
        let cdn_subscription = cdn_options.on_change(move |options, name| {
            if name != DEFAULT_NAME {
                return;
            }
            watched_cdn.store(normalize_cdn_url(&options.url));
            watched_strip.store(options.remove_media_from_path, Ordering::SeqCst);
            tracing::debug!("reloaded CDN URL options");
        });

        let watched_media = Arc::clone(&media_path);
        let media_subscription = media_options.on_change(move |options, name| {
            if name != DEFAULT_NAME {
                return;
            }
            watched_media.store(normalize_media_path(&paths.to_absolute(&options.media_path)));
            tracing::debug!("reloaded media root path");
        });

        Ok(Self {
            inner,
            cdn_url,
            strip_media_path,
            media_path,
            _cdn_subscription: cdn_subscription,
            _media_subscription: media_subscription,
        })
    }
}

impl MediaUrlProvider for CdnMediaUrlProvider {
    fn media_url(
        &self,
        content: &MediaContent,
        property_alias: &str,
        _mode: UrlMode,
        culture: Option<&str>,
        current: &Url,
    ) -> Option<UrlInfo> {
        // Always resolve relative; the CDN base URL carries scheme and host.
        let resolved =
            self.inner
                .media_url(content, property_alias, UrlMode::Relative, culture, current)?;
        let UrlInfo::Url { url, .. } = resolved else {
            // Routes are not URLs; pass them through untouched.
            return Some(resolved);
        };

        let media_path = self.media_path.load();
        let remainder = if self.strip_media_path.load(Ordering::SeqCst)
            && starts_with_ignore_ascii_case(&url, &media_path)
        {
            // Length-based slice: only the leading prefix is removed. No
            // segment-boundary check happens here, so a sibling path that
            // merely starts with the media root is stripped too.
            &url[media_path.len()..]
        } else {
            url.as_str()
        };

        let cdn_url = self.cdn_url.load();
        Some(UrlInfo::url(format!("{cdn_url}{remainder}"), culture))
    }
}

/// Trim the trailing separator so the base URL concatenates cleanly with a
/// site-relative URL.
fn normalize_cdn_url(url: &str) -> Arc<str> {
    Arc::from(url.trim_end_matches('/'))
}

/// Trim the trailing separator so prefix matching lines up with URLs of the
/// form `{root}/{segment}`.
fn normalize_media_path(path: &str) -> Arc<str> {
    Arc::from(path.trim_end_matches('/'))
}

/// Ordinal ASCII-case-insensitive prefix test.
fn starts_with_ignore_ascii_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::paths::SitePathResolver;

    /// Inner provider returning a fixed result and recording requested modes.
    struct StubProvider {
        result: Option<UrlInfo>,
        modes: Mutex<Vec<UrlMode>>,
    }

    impl StubProvider {
        fn returning(result: Option<UrlInfo>) -> Arc<Self> {
            Arc::new(Self {
                result,
                modes: Mutex::new(Vec::new()),
            })
        }
    }

    impl MediaUrlProvider for StubProvider {
        fn media_url(
            &self,
            _content: &MediaContent,
            _property_alias: &str,
            mode: UrlMode,
            _culture: Option<&str>,
            _current: &Url,
        ) -> Option<UrlInfo> {
            self.modes.lock().unwrap().push(mode);
            self.result.clone()
        }
    }

    fn cdn_monitor(url: &str, strip: bool) -> OptionsMonitor<CdnOptions> {
        OptionsMonitor::with_default(CdnOptions {
            url: url.to_owned(),
            remove_media_from_path: strip,
        })
    }

    fn media_monitor(media_path: &str) -> OptionsMonitor<MediaOptions> {
        OptionsMonitor::with_default(MediaOptions {
            media_path: media_path.to_owned(),
        })
    }

    fn request_url() -> Url {
        Url::parse("https://site.example.com/page").unwrap()
    }

    fn content() -> MediaContent {
        MediaContent::new(Uuid::nil(), "/media/1001/photo.jpg")
    }

    fn resolve(provider: &CdnMediaUrlProvider, mode: UrlMode) -> Option<UrlInfo> {
        provider.media_url(&content(), "mediaFile", mode, Some("en-US"), &request_url())
    }

    fn cdn_provider(
        inner: Arc<dyn MediaUrlProvider>,
        cdn: &OptionsMonitor<CdnOptions>,
        media: &OptionsMonitor<MediaOptions>,
    ) -> CdnMediaUrlProvider {
        CdnMediaUrlProvider::new(inner, cdn, media, Arc::new(SitePathResolver::default()))
            .unwrap()
    }

    #[test]
    fn test_strips_media_root_and_prefixes_cdn() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/1001/photo.jpg");
    }

    #[test]
    fn test_strip_disabled_keeps_media_root() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", false),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(
            result.text(),
            "https://cdn.example.com/media/1001/photo.jpg"
        );
    }

    #[test]
    fn test_route_result_passes_through_untouched() {
        let route = UrlInfo::route("media-by-id", Some("en-US"));
        let stub = StubProvider::returning(Some(route.clone()));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result, route);
    }

    #[test]
    fn test_absent_result_passes_through() {
        let stub = StubProvider::returning(None);
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        assert!(resolve(&provider, UrlMode::Default).is_none());
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/Media/1001/x.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/1001/x.jpg");
    }

    #[test]
    fn test_sibling_path_sharing_the_prefix_is_stripped_too() {
        // Prefix matching has no segment-boundary check, so /mediaextra
        // loses its "/media" prefix as well.
        let stub = StubProvider::returning(Some(UrlInfo::url("/mediaextra/x.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/extra/x.jpg");
    }

    #[test]
    fn test_only_leading_prefix_is_stripped() {
        let stub =
            StubProvider::returning(Some(UrlInfo::url("/media/archive/media/x.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(
            result.text(),
            "https://cdn.example.com/archive/media/x.jpg"
        );
    }

    #[test]
    fn test_inner_is_always_asked_for_relative() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let provider = cdn_provider(
            Arc::clone(&stub) as Arc<dyn MediaUrlProvider>,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        resolve(&provider, UrlMode::Absolute);
        resolve(&provider, UrlMode::Auto);

        assert_eq!(
            *stub.modes.lock().unwrap(),
            vec![UrlMode::Relative, UrlMode::Relative]
        );
    }

    #[test]
    fn test_result_is_tagged_with_caller_culture() {
        // The inner provider resolved for a different culture; the rewrite
        // carries the caller's.
        let stub =
            StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", Some("da-DK"))));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.culture(), Some("en-US"));
    }

    #[test]
    fn test_trailing_separator_on_cdn_url_is_trimmed() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com/", true),
            &media_monitor("~/media"),
        );

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/1001/photo.jpg");
    }

    #[test]
    fn test_cdn_options_change_is_picked_up() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let cdn = cdn_monitor("https://cdn.example.com", true);
        let provider = cdn_provider(stub, &cdn, &media_monitor("~/media"));

        cdn.set(
            DEFAULT_NAME,
            CdnOptions {
                url: "https://cdn2.example.com".to_owned(),
                remove_media_from_path: false,
            },
        );
        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(
            result.text(),
            "https://cdn2.example.com/media/1001/photo.jpg"
        );
    }

    #[test]
    fn test_media_options_change_is_reabsolutized() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let media = media_monitor("~/assets");
        let provider = cdn_provider(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media,
        );

        // Root is /assets: the /media URL is not stripped
        let result = resolve(&provider, UrlMode::Default).unwrap();
        assert_eq!(
            result.text(),
            "https://cdn.example.com/media/1001/photo.jpg"
        );

        media.set(
            DEFAULT_NAME,
            MediaOptions {
                media_path: "~/media".to_owned(),
            },
        );
        let result = resolve(&provider, UrlMode::Default).unwrap();
        assert_eq!(result.text(), "https://cdn.example.com/1001/photo.jpg");
    }

    #[test]
    fn test_change_under_non_default_name_is_ignored() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/media/1001/photo.jpg", None)));
        let cdn = cdn_monitor("https://cdn.example.com", true);
        let provider = cdn_provider(stub, &cdn, &media_monitor("~/media"));

        cdn.set(
            "staging",
            CdnOptions {
                url: "https://staging-cdn.example.com".to_owned(),
                remove_media_from_path: true,
            },
        );
        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/1001/photo.jpg");
    }

    #[test]
    fn test_missing_cdn_options_is_invalid_argument() {
        let stub = StubProvider::returning(None);
        let result = CdnMediaUrlProvider::new(
            stub,
            &OptionsMonitor::new(),
            &media_monitor("~/media"),
            Arc::new(SitePathResolver::default()),
        );

        assert!(matches!(result, Err(UrlError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_media_options_is_invalid_argument() {
        let stub = StubProvider::returning(None);
        let result = CdnMediaUrlProvider::new(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &OptionsMonitor::new(),
            Arc::new(SitePathResolver::default()),
        );

        assert!(matches!(result, Err(UrlError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_cdn_url_is_invalid_argument() {
        let stub = StubProvider::returning(None);
        let result = CdnMediaUrlProvider::new(
            stub,
            &cdn_monitor("", true),
            &media_monitor("~/media"),
            Arc::new(SitePathResolver::default()),
        );

        assert!(matches!(result, Err(UrlError::InvalidArgument(_))));
    }

    #[test]
    fn test_app_path_is_part_of_the_media_root() {
        let stub = StubProvider::returning(Some(UrlInfo::url("/site/media/1001/photo.jpg", None)));
        let provider = CdnMediaUrlProvider::new(
            stub,
            &cdn_monitor("https://cdn.example.com", true),
            &media_monitor("~/media"),
            Arc::new(SitePathResolver::new("/site")),
        )
        .unwrap();

        let result = resolve(&provider, UrlMode::Default).unwrap();

        assert_eq!(result.text(), "https://cdn.example.com/1001/photo.jpg");
    }
}
