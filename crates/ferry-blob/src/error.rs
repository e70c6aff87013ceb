//! Blob error type.
//!
//! [`BlobError`] carries a semantic [`BlobErrorKind`] plus the object path,
//! a backend tag, and the underlying SDK error as source. The providers
//! built on top of it perform no retries and no translation: a backend
//! failure surfaces to the caller unchanged, with only enough structure to
//! distinguish "object does not exist" from genuine failures.

/// Semantic error categories over backend-specific failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlobErrorKind {
    /// Object or container does not exist.
    NotFound,
    /// Authentication or authorization failure.
    PermissionDenied,
    /// Connection settings are malformed or incomplete.
    InvalidConfig,
    /// Backend is unreachable or temporarily unavailable.
    Unavailable,
    /// Backend rejected the request due to throttling.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Blob store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct BlobError {
    kind: BlobErrorKind,
    path: Option<String>,
    backend: Option<&'static str>,
    message: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BlobError {
    /// Create a new blob error.
    #[must_use]
    pub fn new(kind: BlobErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            message: None,
            source: None,
        }
    }

    /// Attach the object path the operation targeted.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a backend identifier (e.g. "S3", "Memory").
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach a human-readable detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The semantic error category.
    #[must_use]
    pub fn kind(&self) -> BlobErrorKind {
        self.kind
    }

    /// The object path, if attached.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The backend identifier, if attached.
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// True if this error means the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == BlobErrorKind::NotFound
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(BlobErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid configuration error with a detail message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(BlobErrorKind::InvalidConfig).with_message(message)
    }

    /// Create a blob error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => BlobErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => BlobErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => BlobErrorKind::Timeout,
            _ => BlobErrorKind::Other,
        };
        Self::new(kind).with_source(err)
    }
}

impl std::fmt::Display for BlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message: source (path: cache/key)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            BlobErrorKind::NotFound => "Not found",
            BlobErrorKind::PermissionDenied => "Permission denied",
            BlobErrorKind::InvalidConfig => "Invalid configuration",
            BlobErrorKind::Unavailable => "Unavailable",
            BlobErrorKind::RateLimited => "Rate limited",
            BlobErrorKind::Timeout => "Timeout",
            BlobErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for BlobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
