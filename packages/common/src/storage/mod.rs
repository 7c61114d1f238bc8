mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use filesystem::FilesystemObjectStore;
#[cfg(feature = "object-storage")]
pub use s3::{S3ObjectStore, S3Settings};
pub use traits::{BoxReader, ObjectStore, ReaderRef, StoredObject};
