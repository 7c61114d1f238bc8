use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::traits::{BoxReader, ObjectStore, ReaderRef, StoredObject};

/// Filesystem-backed object store for development and tests.
///
/// Objects live under `{base_path}/{bucket}/{key}`. Writes go through a
/// temp file in `{base_path}/.tmp` and are renamed into place so readers
/// never observe a partial object.
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    bucket: String,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store rooted at `base_path`.
    pub async fn new(base_path: PathBuf, bucket: String) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path.join(&bucket)).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path, bucket })
    }

    /// Compute the filesystem path for a given key.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(&self.bucket).join(key))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn stored(&self, key: &str, path: &Path, size: i64) -> StoredObject {
        StoredObject {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            location: format!("file://{}", path.display()),
            size,
        }
    }
}

/// Reject keys that would resolve outside the bucket directory.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".into()));
    }
    let path = Path::new(key);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(StorageError::InvalidKey(format!(
            "key must be a relative path without '..': {key}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        key: &str,
        reader: ReaderRef<'_>,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let object_path = self.object_path(key)?;
        let temp_path = self.temp_path();

        let mut temp_file = fs::File::create(&temp_path).await?;
        let mut total_bytes: i64 = 0;
        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }
            total_bytes += n as i64;
            if let Err(e) = temp_file.write_all(&buf[..n]).await {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        temp_file.flush().await?;
        drop(temp_file);

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(self.stored(key, &object_path, total_bytes))
    }

    async fn get(&self, key: &str) -> Result<BoxReader, StorageError> {
        let object_path = self.object_path(key)?;
        match fs::File::open(&object_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
