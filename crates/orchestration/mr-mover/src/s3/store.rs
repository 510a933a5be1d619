//! [`ObjectStore`] backed by a single S3 bucket.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use chrono::DateTime;
use mr_error::{Result, StoreError, StoreErrorKind};
use mr_traits::{ListPage, ObjectStore, StoredObject};
use tracing::trace;

use super::client::{S3Config, create_s3_client};

/// S3 implementation of the object store capability.
///
/// All keys live in one bucket; copies are server-side within it.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Wrap an existing client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from configuration and wrap it.
    pub async fn from_config(config: &S3Config) -> Result<Self> {
        let client = create_s3_client(config).await?;
        Ok(Self::new(client, config.bucket.clone()))
    }

    /// The bucket this store operates on.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn copy_source(&self, key: &str) -> String {
        format!("{}/{}", self.bucket, encode_copy_source(key))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> std::result::Result<ListPage, StoreError> {
        let mut req = self.client.list_objects_v2().bucket(&self.bucket);

        if !prefix.is_empty() {
            req = req.prefix(prefix);
        }

        if let Some(token) = continuation_token {
            req = req.continuation_token(token);
        }

        let resp = req.send().await.map_err(|e| map_sdk_error(e, prefix))?;

        let objects = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let key = obj.key.filter(|k| !k.is_empty())?;
                let last_modified = obj
                    .last_modified
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));
                Some(StoredObject {
                    key,
                    size: obj.size.unwrap_or(0).max(0) as u64,
                    last_modified,
                })
            })
            .collect();

        let next_token = if resp.is_truncated == Some(true) {
            resp.next_continuation_token
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn copy(&self, source_key: &str, dest_key: &str) -> std::result::Result<(), StoreError> {
        trace!(source = %source_key, dest = %dest_key, "copy_object");
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(self.copy_source(source_key))
            .key(dest_key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, source_key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StoreError> {
        trace!(key = %key, "delete_object");
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }

    async fn put(&self, key: &str, body: &[u8]) -> std::result::Result<(), StoreError> {
        trace!(key = %key, size = body.len(), "put_object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> std::result::Result<bool, StoreError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_not_found() => Ok(false),
            Err(e) => Err(map_sdk_error(e, key)),
        }
    }
}

/// Map an SDK error onto the store taxonomy.
///
/// Service errors are classified by their error code, falling back to the
/// HTTP status. Transport-level failures are transient.
fn map_sdk_error<E>(err: SdkError<E>, key: &str) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let kind = match &err {
        SdkError::ServiceError(ctx) => {
            kind_for_service_error(ctx.err().code(), Some(ctx.raw().status().as_u16()))
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreErrorKind::TransientProvider
        }
        SdkError::ConstructionFailure(_) => StoreErrorKind::OtherClient,
        _ => StoreErrorKind::TransientProvider,
    };

    StoreError::new(kind, key, DisplayErrorContext(&err).to_string())
}

/// Classify a service error by code name, then by HTTP status.
fn kind_for_service_error(code: Option<&str>, status: Option<u16>) -> StoreErrorKind {
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => StoreErrorKind::NotFound,
        Some(
            "AccessDenied"
            | "Forbidden"
            | "AllAccessDisabled"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken",
        ) => StoreErrorKind::AccessDenied,
        Some(
            "SlowDown"
            | "Throttling"
            | "ThrottlingException"
            | "TooManyRequests"
            | "RequestTimeout"
            | "InternalError"
            | "ServiceUnavailable",
        ) => StoreErrorKind::TransientProvider,
        _ => match status {
            Some(404) => StoreErrorKind::NotFound,
            Some(403) => StoreErrorKind::AccessDenied,
            Some(429) => StoreErrorKind::TransientProvider,
            Some(s) if s >= 500 => StoreErrorKind::TransientProvider,
            _ => StoreErrorKind::OtherClient,
        },
    }
}

/// Percent-encode a key for the `x-amz-copy-source` header.
///
/// Unreserved characters and `/` pass through; every other byte is
/// encoded, so keys with spaces, `+` or non-ASCII survive the copy.
fn encode_copy_source(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
