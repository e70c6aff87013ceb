//! S3 blob container backend for Ferry.
//!
//! [`S3Container`] implements [`BlobContainer`] over `aws-sdk-s3`, against
//! AWS S3 or any S3-compatible store (a custom `endpoint` switches the
//! client to path-style addressing). [`S3Connector`] builds containers from
//! [`BlobStoreOptions`] so consumers can rebuild their handle on
//! configuration changes.
//!
//! The client is constructed synchronously from static credentials carried
//! in the connection string; no environment or instance-profile credential
//! resolution happens here. All SDK failures are classified into
//! [`BlobErrorKind`](ferry_blob::BlobErrorKind) with the original error kept
//! as source; nothing is retried at this layer.

mod conn;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use ferry_blob::{
    BlobConnector, BlobContainer, BlobDownload, BlobError, BlobErrorKind, BlobMetadata,
};
use ferry_config::BlobStoreOptions;

const BACKEND: &str = "S3";

/// Region used when only a custom endpoint is configured; S3-compatible
/// stores accept any region but the SDK requires one for signing.
const FALLBACK_REGION: &str = "us-east-1";

/// [`BlobContainer`] backed by an S3 bucket.
#[derive(Debug)]
pub struct S3Container {
    client: Client,
    bucket: String,
}

impl S3Container {
    /// Build a container handle from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] with kind
    /// [`InvalidConfig`](BlobErrorKind::InvalidConfig) if the connection
    /// string is malformed or the container name is empty.
    pub fn connect(options: &BlobStoreOptions) -> Result<Self, BlobError> {
        if options.container.trim().is_empty() {
            return Err(BlobError::invalid_config("container name is empty").with_backend(BACKEND));
        }
        let settings = conn::parse(&options.connection_string)?;

        let credentials = Credentials::new(
            settings.access_key,
            settings.secret_key,
            None,
            None,
            "ferry-blob-s3",
        );
        let region = settings
            .region
            .unwrap_or_else(|| FALLBACK_REGION.to_owned());
        let mut config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region));
        if let Some(endpoint) = settings.endpoint {
            config = config.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::debug!("connected S3 container client for bucket {}", options.container);
        Ok(Self {
            client: Client::from_conf(config.build()),
            bucket: options.container.clone(),
        })
    }

    /// Wrap an already-constructed client.
    #[must_use]
    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket this container targets.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobContainer for S3Container {
    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if matches!(err.as_service_error(), Some(service) if service.is_not_found()) {
                    Ok(false)
                } else {
                    Err(map_sdk_error(err, path))
                }
            }
        }
    }

    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: &BlobMetadata,
    ) -> Result<(), BlobError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(data));
        for (key, value) in metadata {
            request = request.metadata(key, value);
        }
        request
            .send()
            .await
            .map_err(|err| map_sdk_error(err, path))?;
        Ok(())
    }

    async fn open(&self, path: &str) -> Result<BlobDownload, BlobError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|err| {
                if matches!(err.as_service_error(), Some(service) if service.is_no_such_key()) {
                    BlobError::not_found(path)
                        .with_backend(BACKEND)
                        .with_source(err)
                } else {
                    map_sdk_error(err, path)
                }
            })?;

        let metadata: BlobMetadata = response
            .metadata()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        Ok(BlobDownload {
            metadata,
            reader: Box::new(response.body.into_async_read()),
        })
    }
}

/// [`BlobConnector`] producing [`S3Container`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct S3Connector;

impl S3Connector {
    /// Create a new connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BlobConnector for S3Connector {
    fn connect(&self, options: &BlobStoreOptions) -> Result<Arc<dyn BlobContainer>, BlobError> {
        Ok(Arc::new(S3Container::connect(options)?))
    }
}

/// Classify an S3 error code into a semantic kind.
fn classify_code(code: Option<&str>) -> BlobErrorKind {
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => BlobErrorKind::NotFound,
        Some(
            "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken",
        ) => BlobErrorKind::PermissionDenied,
        Some("SlowDown" | "TooManyRequests" | "RequestLimitExceeded") => BlobErrorKind::RateLimited,
        Some("RequestTimeout") => BlobErrorKind::Timeout,
        Some("ServiceUnavailable" | "InternalError") => BlobErrorKind::Unavailable,
        _ => BlobErrorKind::Other,
    }
}

/// Map an SDK error onto [`BlobError`], keeping the original as source.
fn map_sdk_error<E, R>(err: SdkError<E, R>, path: &str) -> BlobError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let kind = match &err {
        SdkError::TimeoutError(_) => BlobErrorKind::Timeout,
        SdkError::DispatchFailure(_) => BlobErrorKind::Unavailable,
        SdkError::ServiceError(_) => {
            classify_code(err.as_service_error().and_then(ProvideErrorMetadata::code))
        }
        _ => BlobErrorKind::Other,
    };
    BlobError::new(kind)
        .with_backend(BACKEND)
        .with_path(path)
        .with_source(err)
}
