//! Virtual path absolutization.

/// Resolves virtual paths against the host environment.
pub trait MediaPathResolver: Send + Sync {
    /// Resolve a virtual path (e.g. `~/media`) to a site-relative absolute
    /// path (e.g. `/media`).
    fn to_absolute(&self, virtual_path: &str) -> String;
}

/// [`MediaPathResolver`] rooted at the site's application path.
///
/// `~/` expands to the application path; already-absolute paths pass
/// through unchanged; bare relative paths resolve under the application
/// path as well.
#[derive(Debug, Clone)]
pub struct SitePathResolver {
    app_path: String,
}

impl Default for SitePathResolver {
    fn default() -> Self {
        Self::new("/")
    }
}

impl SitePathResolver {
    /// Create a resolver for the given application base path (e.g. `/` or
    /// `/site`).
    #[must_use]
    pub fn new(app_path: impl Into<String>) -> Self {
        let mut app_path: String = app_path.into();
        while app_path.ends_with('/') {
            app_path.pop();
        }
        Self { app_path }
    }
}

impl MediaPathResolver for SitePathResolver {
    fn to_absolute(&self, virtual_path: &str) -> String {
        if let Some(rest) = virtual_path.strip_prefix("~/") {
            format!("{}/{rest}", self.app_path)
        } else if virtual_path.starts_with('/') {
            virtual_path.to_owned()
        } else {
            format!("{}/{virtual_path}", self.app_path)
        }
    }
}
