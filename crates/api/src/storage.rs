//! Object storage for deliverable files.
//!
//! The core only ever needs `put(path, bytes) -> url`; file contents are
//! never inspected. [`S3ObjectStore`] is the production backend;
//! [`MemoryObjectStore`] backs tests and storage-less local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;

/// Failure from the storage backend. Message passthrough only.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StorageError(pub String);

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Remote(err.0)
    }
}

/// Storage backend seam.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store `bytes` at `path`, returning a public URL for the object.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Build from the environment, or `None` when no bucket is configured.
    ///
    /// | Env Var              | Required | Default                              |
    /// |----------------------|----------|--------------------------------------|
    /// | `STORAGE_BUCKET`     | **yes**  | --                                   |
    /// | `STORAGE_PUBLIC_URL` | no       | `https://<bucket>.s3.amazonaws.com`  |
    ///
    /// AWS credentials and region come from the standard SDK environment.
    pub async fn from_env() -> Option<Self> {
        let bucket = std::env::var("STORAGE_BUCKET").ok()?;
        let public_base_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        Some(Self {
            client,
            bucket,
            public_base_url,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| StorageError(err.to_string()))?;
        Ok(format!(
            "{}/{path}",
            self.public_base_url.trim_end_matches('/')
        ))
    }
}

/// In-memory object store for tests and local development without a bucket.
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self {
            base_url: "memory://objects".to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch stored bytes back out (test assertions).
    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).cloned()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(format!("{}/{path}", self.base_url))
    }
}
