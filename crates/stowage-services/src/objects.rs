//! Object operations: validated upload, single delete and prefix delete.

use bytes::Bytes;
use chrono::Utc;
use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use stowage_core::{AppError, Config, StorageBackend, UploadCategory, UploadResult};
use stowage_processing::{UploadValidator, ValidatedUpload};
use stowage_storage::keys::{self, derive_storage_key, generate_file_id};
use stowage_storage::{
    create_blob_store, list_pages, BlobStore, BucketManager, BucketStatus, StorageError,
    MAX_KEYS_PER_REQUEST,
};

/// Object metadata keys written on every upload
pub const META_ORIGINAL_FILENAME: &str = "original-filename";
pub const META_UPLOAD_DATE: &str = "upload-date";
pub const META_USER_ID: &str = "user-id";

type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Facade over the blob store for the object lifecycle.
///
/// Holds no per-request state; clone freely and share across tasks.
#[derive(Clone)]
pub struct ObjectService {
    store: Arc<dyn BlobStore>,
    buckets: BucketManager,
    base_url: String,
    validator: UploadValidator,
    page_size: usize,
    id_generator: IdGenerator,
}

impl ObjectService {
    pub fn new(store: Arc<dyn BlobStore>, base_url: &str, skip_bucket_check: bool) -> Self {
        Self {
            buckets: BucketManager::new(store.clone(), skip_bucket_check),
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
            validator: UploadValidator::new(),
            page_size: MAX_KEYS_PER_REQUEST,
            id_generator: Arc::new(generate_file_id),
        }
    }

    /// Build the blob store described by `config` and wrap it.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = create_blob_store(config).await.map_err(app_error)?;
        Ok(Self::new(
            store,
            config.public_url(),
            config.skip_bucket_check(),
        ))
    }

    /// Keys listed and removed per round trip in `delete_folder`, capped at 1000.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_KEYS_PER_REQUEST);
        self
    }

    /// Replace the identifier source used when uploads carry no filename.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self
    }

    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.store.backend_type()
    }

    /// Startup provisioning; see [`BucketManager::ensure_bucket`].
    pub async fn ensure_bucket(&self) -> Result<BucketStatus, AppError> {
        self.buckets.ensure_bucket().await.map_err(app_error)
    }

    /// Health check: Ok while the bucket exists and answers.
    pub async fn health(&self) -> Result<(), AppError> {
        self.buckets.bucket_exists().await.map_err(app_error)
    }

    /// Validate an upload without storing it.
    pub async fn validate(
        &self,
        category: UploadCategory,
        data: Bytes,
        declared_filename: Option<&str>,
    ) -> Result<ValidatedUpload, AppError> {
        let validator = self.validator;
        let filename = declared_filename.map(str::to_string);

        let validated = tokio::task::spawn_blocking(move || {
            validator.validate(&data, category, filename.as_deref())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Validation task failed: {}", e)))??;

        Ok(validated)
    }

    /// Validate and store an upload under `{user_id}/{category}/{secure_filename}`.
    #[tracing::instrument(
        skip(self, data),
        fields(bucket = %self.store.bucket(), category = %category)
    )]
    pub async fn put(
        &self,
        user_id: &str,
        category: UploadCategory,
        data: Bytes,
        declared_filename: Option<&str>,
    ) -> Result<UploadResult, AppError> {
        let validated = self
            .validate(category, data.clone(), declared_filename)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Upload rejected"))?;

        let key = derive_storage_key(
            user_id,
            category,
            validated.extension,
            declared_filename,
            || (self.id_generator)(),
        )
        .map_err(app_error)?;

        let mut metadata = HashMap::new();
        metadata.insert(
            META_ORIGINAL_FILENAME.to_string(),
            header_safe(declared_filename.unwrap_or(key.secure_filename())),
        );
        metadata.insert(META_UPLOAD_DATE.to_string(), Utc::now().to_rfc3339());
        metadata.insert(META_USER_ID.to_string(), header_safe(user_id));

        let start = Instant::now();
        self.store
            .put_object(key.as_str(), data, validated.mime_type, &metadata)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    size_bytes = validated.size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Storing object failed"
                );
                AppError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            key = %key,
            size_bytes = validated.size,
            mime_type = validated.mime_type,
            digest = %validated.digest_prefix,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object stored"
        );

        Ok(UploadResult {
            url: key.url(&self.base_url),
            secure_filename: key.secure_filename().to_string(),
        })
    }

    /// Remove one object addressed by the filename the caller recorded.
    ///
    /// Removing an object that does not exist succeeds.
    #[tracing::instrument(skip(self), fields(bucket = %self.store.bucket(), category = %category))]
    pub async fn delete_one(
        &self,
        user_id: &str,
        category: UploadCategory,
        filename: &str,
    ) -> Result<(), AppError> {
        let key = keys::object_key(user_id, category, filename).map_err(app_error)?;

        self.store.delete_object(&key).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Deleting object failed");
            AppError::DeleteFailed { path: key.clone() }
        })?;

        tracing::info!(key = %key, "Object deleted");
        Ok(())
    }

    /// Remove every object under `prefix`, one listing page at a time.
    ///
    /// Each page is removed with a single bulk call before the next page is fetched, so
    /// memory stays bounded by the page size. Returns the number of keys removed. Objects
    /// written under the prefix while this runs may survive.
    #[tracing::instrument(skip(self), fields(bucket = %self.store.bucket()))]
    pub async fn delete_folder(&self, prefix: &str) -> Result<usize, AppError> {
        if prefix.is_empty() {
            return Err(AppError::InvalidKey(
                "refusing to delete an empty prefix".to_string(),
            ));
        }

        let start = Instant::now();
        let path = format!("{}/{}", self.store.bucket(), prefix);
        let delete_failed = |e: StorageError| {
            tracing::error!(error = %e, prefix = %prefix, "Deleting folder failed");
            AppError::DeleteFailed { path: path.clone() }
        };

        let mut pages = std::pin::pin!(list_pages(self.store.as_ref(), prefix, self.page_size));
        let mut deleted = 0usize;

        while let Some(page) = pages.try_next().await.map_err(&delete_failed)? {
            if page.is_empty() {
                continue;
            }
            self.store
                .delete_objects(&page)
                .await
                .map_err(&delete_failed)?;
            deleted += page.len();
            tracing::debug!(prefix = %prefix, batch = page.len(), deleted, "Deleted page");
        }

        tracing::info!(
            prefix = %prefix,
            deleted,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Folder deleted"
        );
        Ok(deleted)
    }

    /// Remove every object of one user, across all categories.
    pub async fn delete_user(&self, user_id: &str) -> Result<usize, AppError> {
        let prefix = keys::user_prefix(user_id).map_err(app_error)?;
        self.delete_folder(&prefix).await
    }
}

/// Metadata travels as HTTP headers; keep values printable ASCII.
fn header_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect()
}

/// Map a storage failure to the client-facing error category.
pub fn app_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidKey(msg) => AppError::InvalidKey(msg),
        StorageError::UploadFailed(msg) => AppError::UploadFailed(msg),
        StorageError::DeleteFailed(msg) => AppError::DeleteFailed { path: msg },
        StorageError::BucketCreation(msg) => AppError::BucketCreation(msg),
        StorageError::BucketPolicy(msg) => AppError::BucketPolicy(msg),
        StorageError::BucketUnavailable(msg) => AppError::BucketUnavailable(msg),
        StorageError::ConfigError(msg) => AppError::Configuration(msg),
        StorageError::ListFailed(msg) | StorageError::BackendError(msg) => AppError::Internal(msg),
    }
}
