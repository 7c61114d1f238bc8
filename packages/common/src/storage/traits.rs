use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Borrowed async reader accepted by `put`. Borrowed rather than boxed so
/// request-scoped upload streams can be passed straight through.
pub type ReaderRef<'a> = &'a mut (dyn AsyncRead + Unpin + Send);

/// The result of storing an object: where it lives and how large it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Name of the bucket/container the object was written to.
    pub bucket: String,
    /// Key of the object within the bucket, exactly as given to `put`.
    pub key: String,
    /// Resolvable locator (URL) for the stored object.
    pub location: String,
    /// Number of bytes streamed to the store.
    pub size: i64,
}

/// Key-addressed object storage over a single bucket.
///
/// A `put` stores under the literal key given: no renaming, no
/// deduplication, no collision detection. A second `put` with the same key
/// silently overwrites the first object; callers own the key-uniqueness
/// policy.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream the reader's contents to the store under `key`.
    async fn put(
        &self,
        key: &str,
        reader: ReaderRef<'_>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Store a byte slice under `key`.
    async fn put_bytes(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut reader = Cursor::new(data.to_vec());
        self.put(key, &mut reader, content_type).await
    }

    /// Retrieve the object under `key` as a lazy byte stream.
    ///
    /// The reader is consumed exactly once; nothing is buffered beyond the
    /// transport's own chunking. Fails with `NotFound` if the key does not
    /// exist.
    async fn get(&self, key: &str) -> Result<BoxReader, StorageError>;

    /// Remove the object under `key`.
    ///
    /// Surfaces `NotFound` when the backend can tell the key was absent.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
