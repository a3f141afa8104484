#[cfg(feature = "storage-memory")]
use crate::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
use crate::S3BlobStore;
use crate::{BlobStore, StorageBackend, StorageError, StorageResult};
use stowage_core::Config;
use std::sync::Arc;

/// Create a blob store based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let credentials = match (config.access_key(), config.secret_key()) {
                (Some(access_key), Some(secret_key)) => {
                    Some((access_key.to_string(), secret_key.to_string()))
                }
                (None, None) => None,
                _ => {
                    return Err(StorageError::ConfigError(
                        "STORAGE_ACCESS_KEY and STORAGE_SECRET_KEY must be set together"
                            .to_string(),
                    ))
                }
            };

            let store = S3BlobStore::new(
                config.bucket().to_string(),
                config.region().to_string(),
                config.endpoint_url(),
                credentials,
            )
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            tracing::warn!(
                bucket = %config.bucket(),
                "Using in-memory blob store; objects are lost on exit"
            );
            Ok(Arc::new(MemoryBlobStore::new(config.bucket())))
        }

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)"
                .to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-memory"))]
mod tests {
    use super::*;
    use stowage_core::config::StorageConfig;

    #[tokio::test]
    async fn test_memory_backend_selected_from_config() {
        let cfg = StorageConfig::from_lookup(|key| match key {
            "STORAGE_BUCKET" => Some("resumes".to_string()),
            "STORAGE_URL" => Some("https://cdn.example.com".to_string()),
            "STORAGE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();

        let store = create_blob_store(&Config(Box::new(cfg))).await.unwrap();
        assert_eq!(store.backend_type(), StorageBackend::Memory);
        assert_eq!(store.bucket(), "resumes");
        assert!(!store.bucket_exists().await.unwrap());
    }
}
