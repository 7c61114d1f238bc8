use async_trait::async_trait;
use futures::StreamExt;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tokio_util::io::StreamReader;

use super::error::StorageError;
use super::traits::{BoxReader, ObjectStore, ReaderRef, StoredObject};

/// Connection settings for the S3 backend, loaded once at process start
/// and injected here rather than read from ambient globals.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO and friends). Implies path-style addressing.
    pub endpoint: Option<String>,
    /// Explicit credentials. When absent, the SDK's default chain
    /// (environment, profile, instance metadata) is used.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// S3-backed object store over a single bucket.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    bucket_name: String,
    base_url: String,
}

impl S3ObjectStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let credentials = match (&settings.access_key, &settings.secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access), Some(secret), None, None, None)
                    .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?
            }
            _ => Credentials::default()
                .map_err(|e| StorageError::Backend(format!("credential lookup failed: {e}")))?,
        };

        let (region, base_url, path_style) = match &settings.endpoint {
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/').to_string();
                let base_url = format!("{}/{}", endpoint, settings.bucket);
                let region = Region::Custom {
                    region: settings.region.clone(),
                    endpoint,
                };
                (region, base_url, true)
            }
            None => {
                let region: Region = settings
                    .region
                    .parse()
                    .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?;
                let base_url = format!(
                    "https://{}.s3.{}.amazonaws.com",
                    settings.bucket, settings.region
                );
                (region, base_url, false)
            }
        };

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            bucket_name: settings.bucket.clone(),
            base_url,
        })
    }

    fn object_location(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        mut reader: ReaderRef<'_>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(|e| map_s3_error(key, e))?;

        Ok(StoredObject {
            bucket: self.bucket_name.clone(),
            key: key.to_string(),
            location: self.object_location(key),
            size: response.uploaded_bytes() as i64,
        })
    }

    async fn get(&self, key: &str) -> Result<BoxReader, StorageError> {
        let response = self
            .bucket
            .get_object_stream(key)
            .await
            .map_err(|e| map_s3_error(key, e))?;

        let stream = response
            .bytes
            .map(|chunk| chunk.map_err(std::io::Error::other));
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| map_s3_error(key, e))?;

        // S3 reports 204 for missing keys too, so a NotFound here only
        // shows up on stores that actually check.
        match response.status_code() {
            200..=299 => Ok(()),
            404 => Err(StorageError::NotFound(key.to_string())),
            code => Err(StorageError::Backend(format!(
                "unexpected status {code} deleting '{key}'"
            ))),
        }
    }
}

fn map_s3_error(key: &str, err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(key.to_string()),
        other => StorageError::Backend(other.to_string()),
    }
}
