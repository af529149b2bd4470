mod local;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Internal(String),
}

/// Object storage for task attachments, addressed by bucket and key.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

// -- Configuration --

/// Configuration for the attachment store backend.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// S3-compatible endpoint URL (e.g. "https://storage.googleapis.com").
    /// When `None`, use the local filesystem.
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Local filesystem base directory (used when S3 is not configured).
    pub local_data_dir: Option<String>,
}

impl StoreConfig {
    /// Build from environment variables.
    /// If `TODO_S3_ENDPOINT` (or `AWS_ENDPOINT_URL`) is set along with
    /// credentials, use S3. Otherwise fall back to the local filesystem
    /// under `TODO_STORE_DIR`.
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("TODO_S3_ENDPOINT")
                .or_else(|_| std::env::var("AWS_ENDPOINT_URL"))
                .ok(),
            region: std::env::var("TODO_S3_REGION")
                .or_else(|_| std::env::var("AWS_REGION"))
                .ok(),
            access_key_id: std::env::var("TODO_S3_ACCESS_KEY_ID")
                .or_else(|_| std::env::var("AWS_ACCESS_KEY_ID"))
                .ok(),
            secret_access_key: std::env::var("TODO_S3_SECRET_ACCESS_KEY")
                .or_else(|_| std::env::var("AWS_SECRET_ACCESS_KEY"))
                .ok(),
            local_data_dir: std::env::var("TODO_STORE_DIR").ok(),
        }
    }

    pub fn is_s3(&self) -> bool {
        self.endpoint_url.is_some()
            && self.access_key_id.is_some()
            && self.secret_access_key.is_some()
    }
}

// -- Factory --

/// Create an `AttachmentStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn AttachmentStore>, StoreError> {
    if config.is_s3() {
        #[cfg(feature = "s3")]
        {
            tracing::info!(endpoint = ?config.endpoint_url, "using s3 attachment store");
            Ok(Arc::new(S3Store::new(config)?))
        }
        #[cfg(not(feature = "s3"))]
        {
            Err(StoreError::Internal(
                "S3 configuration detected but the 's3' feature is not enabled".into(),
            ))
        }
    } else {
        let store = LocalStore::new(config);
        tracing::info!(dir = %store.base_dir().display(), "using local attachment store");
        Ok(Arc::new(store))
    }
}
