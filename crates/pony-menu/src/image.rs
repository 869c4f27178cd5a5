//! Dish image storage.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use pony_core::error::{PonyError, PonyResult};
use tracing::info;
use uuid::Uuid;

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Stores image blobs and returns their public URL.
pub trait ImageStore: Send + Sync {
    fn upload(&self, upload: ImageUpload) -> impl Future<Output = PonyResult<String>> + Send;

    /// Delete an object previously returned by [`ImageStore::upload`].
    /// Removing an object that is already gone succeeds.
    fn remove(&self, url: &str) -> impl Future<Output = PonyResult<()>> + Send;
}

/// Writes images under a local directory that is served at `base_url`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Random object key that keeps the original extension, if it has a
/// sane one.
fn object_key(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}

impl ImageStore for LocalImageStore {
    async fn upload(&self, upload: ImageUpload) -> PonyResult<String> {
        if upload.bytes.is_empty() {
            return Err(PonyError::validation("image is empty"));
        }

        let key = object_key(&upload.file_name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PonyError::Storage(format!("create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(&key);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| PonyError::Storage(format!("write {}: {e}", path.display())))?;

        info!(
            key = %key,
            size = upload.bytes.len(),
            content_type = upload.content_type.as_deref().unwrap_or("unknown"),
            "Stored image"
        );

        Ok(format!("{}/{key}", self.base_url))
    }

    async fn remove(&self, url: &str) -> PonyResult<()> {
        let key = url
            .strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty() && *key != ".." && !key.contains(['/', '\\']))
            .ok_or_else(|| PonyError::validation(format!("not a stored image: {url}")))?;

        let path = self.dir.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(key = %key, "Removed image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PonyError::Storage(format!("remove {}: {e}", path.display()))),
        }
    }
}
