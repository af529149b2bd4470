use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{AttachmentStore, StoreConfig, StoreError};

/// Filesystem store laid out as `<base_dir>/<bucket>/<key>`. Content types
/// are not recorded.
pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        let base_dir = config
            .local_data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Rejects anything that could climb out of the base directory.
    fn resolve(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        for part in [bucket, key] {
            let safe = !part.is_empty()
                && Path::new(part)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !safe {
                return Err(StoreError::Internal(format!("invalid object path: {part}")));
            }
        }
        Ok(self.base_dir.join(bucket).join(key))
    }
}

fn default_data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("todo-api")
}

#[async_trait]
impl AttachmentStore for LocalStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        let path = self.resolve(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Internal(format!("mkdir: {e}")))?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &Path) -> LocalStore {
        LocalStore::new(&StoreConfig {
            local_data_dir: Some(dir.to_string_lossy().to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn put_writes_under_bucket_and_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store
            .put(
                "image-wreg",
                "wr/todo_attachment/cat.png",
                Bytes::from("png bytes"),
                "image/png",
            )
            .await
            .unwrap();
        let data = std::fs::read(tmp.path().join("image-wreg/wr/todo_attachment/cat.png")).unwrap();
        assert_eq!(data, b"png bytes");
    }

    #[tokio::test]
    async fn put_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store
            .put("b", "key", Bytes::from("first"), "image/png")
            .await
            .unwrap();
        store
            .put("b", "key", Bytes::from("second"), "image/png")
            .await
            .unwrap();

        let data = std::fs::read(tmp.path().join("b/key")).unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        for (bucket, key) in [("b", "../escape.png"), ("..", "x.png"), ("b", "/etc/x"), ("", "x")] {
            let err = store
                .put(bucket, key, Bytes::from("x"), "image/png")
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Internal(_)), "{bucket}/{key}");
        }
    }
}
