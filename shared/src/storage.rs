//! Object storage access for the event collection document.

use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::error::{Error, Result};

/// An object fetched from storage together with its version tag.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub etag: Option<String>,
}

/// Whole-object storage, the way the collection document is accessed.
///
/// There is no partial update or append; every write replaces the object.
/// A `put` guarded by `if_match` fails with [`Error::Conflict`] when the
/// stored object no longer carries the expected tag, and the caller re-reads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full object at `key`.
    async fn get(&self, key: &str) -> Result<StoredObject>;

    /// Overwrite the full object at `key`, optionally guarded by `if_match`.
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        if_match: Option<&str>,
    ) -> Result<()>;
}

/// S3-backed object store scoped to a single bucket.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<StoredObject> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to get {}: {}", key, e)))?;

        let etag = resp.e_tag().map(|s| s.to_string());
        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", key, e)))?
            .into_bytes();

        Ok(StoredObject { body, etag })
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        if_match: Option<&str>,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body.into());

        if let Some(etag) = if_match {
            request = request.if_match(etag);
        }

        request.send().await.map_err(|e| {
            if e.code() == Some("PreconditionFailed") {
                Error::Conflict(format!("{} was rewritten by a concurrent writer", key))
            } else {
                Error::Storage(format!("Failed to put {}: {}", key, e))
            }
        })?;

        Ok(())
    }
}
