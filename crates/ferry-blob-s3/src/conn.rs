//! Connection string parsing.
//!
//! A connection string is a list of `key=value` pairs separated by `;`:
//!
//! ```text
//! endpoint=https://s3.example.com;region=us-east-1;access_key=AKIA...;secret_key=...
//! ```
//!
//! Accepted keys:
//!
//! - `access_key`, `secret_key` (required)
//! - `endpoint` (optional; S3-compatible stores)
//! - `region` (optional when `endpoint` is set, required otherwise)

use ferry_blob::BlobError;

/// Parsed connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConnectionSettings {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: String,
    pub secret_key: String,
}

/// Parse a connection string into [`ConnectionSettings`].
pub(crate) fn parse(raw: &str) -> Result<ConnectionSettings, BlobError> {
    let mut endpoint = None;
    let mut region = None;
    let mut access_key = None;
    let mut secret_key = None;

    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(BlobError::invalid_config(format!(
                "connection string segment {segment:?} is not a key=value pair"
            )));
        };
        let key = key.trim();
        let value = value.trim();
        if value.is_empty() {
            return Err(BlobError::invalid_config(format!(
                "connection string key {key:?} has an empty value"
            )));
        }

        let slot = match key {
            "endpoint" => &mut endpoint,
            "region" => &mut region,
            "access_key" => &mut access_key,
            "secret_key" => &mut secret_key,
            _ => {
                return Err(BlobError::invalid_config(format!(
                    "unknown connection string key {key:?}"
                )));
            }
        };
        if slot.is_some() {
            return Err(BlobError::invalid_config(format!(
                "duplicate connection string key {key:?}"
            )));
        }
        *slot = Some(value.to_owned());
    }

    let access_key =
        access_key.ok_or_else(|| BlobError::invalid_config("connection string is missing access_key"))?;
    let secret_key =
        secret_key.ok_or_else(|| BlobError::invalid_config("connection string is missing secret_key"))?;
    if endpoint.is_none() && region.is_none() {
        return Err(BlobError::invalid_config(
            "connection string must set endpoint or region",
        ));
    }

    Ok(ConnectionSettings {
        endpoint,
        region,
        access_key,
        secret_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_blob::BlobErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_all_keys() {
        let settings = parse(
            "endpoint=https://s3.example.com;region=eu-west-1;access_key=AKIA123;secret_key=shhh",
        )
        .unwrap();

        assert_eq!(
            settings,
            ConnectionSettings {
                endpoint: Some("https://s3.example.com".to_owned()),
                region: Some("eu-west-1".to_owned()),
                access_key: "AKIA123".to_owned(),
                secret_key: "shhh".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_trims_whitespace_and_skips_empty_segments() {
        let settings =
            parse(" endpoint = https://s3.example.com ; access_key=k ; secret_key=s ; ").unwrap();

        assert_eq!(settings.endpoint.as_deref(), Some("https://s3.example.com"));
        assert_eq!(settings.access_key, "k");
    }

    #[test]
    fn test_parse_region_only() {
        let settings = parse("region=us-east-1;access_key=k;secret_key=s").unwrap();

        assert!(settings.endpoint.is_none());
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_missing_access_key_is_invalid() {
        let err = parse("endpoint=https://s3.example.com;secret_key=s").unwrap_err();

        assert_eq!(err.kind(), BlobErrorKind::InvalidConfig);
        assert!(err.to_string().contains("access_key"));
    }

    #[test]
    fn test_missing_secret_key_is_invalid() {
        let err = parse("endpoint=https://s3.example.com;access_key=k").unwrap_err();

        assert_eq!(err.kind(), BlobErrorKind::InvalidConfig);
    }

    #[test]
    fn test_missing_endpoint_and_region_is_invalid() {
        let err = parse("access_key=k;secret_key=s").unwrap_err();

        assert!(err.to_string().contains("endpoint or region"));
    }

    #[test]
    fn test_unknown_key_is_invalid() {
        let err = parse("endpoint=https://s3.example.com;access_key=k;secret_key=s;bucket=x")
            .unwrap_err();

        assert!(err.to_string().contains("unknown connection string key"));
    }

    #[test]
    fn test_segment_without_equals_is_invalid() {
        let err = parse("endpoint").unwrap_err();

        assert_eq!(err.kind(), BlobErrorKind::InvalidConfig);
    }

    #[test]
    fn test_duplicate_key_is_invalid() {
        let err =
            parse("region=a;region=b;access_key=k;secret_key=s").unwrap_err();

        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_value_is_invalid() {
        let err = parse("endpoint=;access_key=k;secret_key=s").unwrap_err();

        assert!(err.to_string().contains("empty value"));
    }
}
