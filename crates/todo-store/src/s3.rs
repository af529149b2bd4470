use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;

use crate::{AttachmentStore, StoreConfig, StoreError};

/// S3-compatible store. Buckets are chosen per call, so only the region and
/// credentials are held.
pub struct S3Store {
    region: Region,
    credentials: Credentials,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store").finish_non_exhaustive()
    }
}

impl S3Store {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let region = Region::Custom {
            region: config.region.clone().unwrap_or_else(|| "us-east-1".into()),
            endpoint: config.endpoint_url.clone().unwrap_or_default(),
        };

        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Internal(format!("credentials: {e}")))?;

        Ok(Self {
            region,
            credentials,
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StoreError> {
        let mut bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(|e| StoreError::Internal(format!("bucket: {e}")))?;
        bucket.set_path_style();
        Ok(bucket)
    }
}

fn map_s3_error(e: S3Error) -> StoreError {
    StoreError::Internal(format!("s3: {e}"))
}

#[async_trait]
impl AttachmentStore for S3Store {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .bucket(bucket)?
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(map_s3_error)?;
        if response.status_code() >= 300 {
            return Err(StoreError::Internal(format!(
                "s3 put {bucket}/{key}: status {}",
                response.status_code()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_creates_store() {
        let config = StoreConfig {
            endpoint_url: Some("http://localhost:3900".into()),
            region: Some("garage".into()),
            access_key_id: Some("key".into()),
            secret_access_key: Some("secret".into()),
            local_data_dir: None,
        };
        let store = S3Store::new(&config).unwrap();
        assert!(store.bucket("image-wreg").is_ok());
    }

    // -- S3 integration tests (require a reachable S3-compatible endpoint) --

    #[tokio::test]
    #[ignore]
    async fn s3_put_stores_object() {
        let config = StoreConfig::from_env();
        assert!(config.is_s3(), "S3 not configured");
        let bucket = std::env::var("TODO_S3_TEST_BUCKET").unwrap_or_else(|_| "image-wreg".into());
        let store = S3Store::new(&config).unwrap();
        let key = "integration-test/roundtrip.png";

        store
            .put(&bucket, key, Bytes::from("hello s3"), "image/png")
            .await
            .unwrap();
        let object = store.bucket(&bucket).unwrap().get_object(key).await.unwrap();
        assert_eq!(object.status_code(), 200);
        assert_eq!(object.to_vec(), b"hello s3");
    }
}
