//! Bucket lifecycle: startup existence check, creation and public-read policy.

use std::fmt;
use std::sync::Arc;

use crate::bucket_policy::{missing_public_read, public_read_policy, public_read_resources};
use crate::traits::{BlobStore, StorageError, StorageResult};

/// Outcome of [`BucketManager::ensure_bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// The check was disabled by configuration; nothing was contacted
    Skipped,
    /// The bucket was already there
    Existing,
    /// The bucket was created and the public-read policy attached
    Created,
}

impl fmt::Display for BucketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketStatus::Skipped => write!(f, "skipped"),
            BucketStatus::Existing => write!(f, "existing"),
            BucketStatus::Created => write!(f, "created"),
        }
    }
}

/// Operator notice for a disabled bucket check, naming every prefix that must
/// already be publicly readable.
pub fn skipped_check_notice(bucket: &str) -> String {
    format!(
        "Bucket check skipped; bucket {} must exist and grant public s3:GetObject on {}",
        bucket,
        public_read_resources(bucket).join(", ")
    )
}

#[derive(Clone)]
pub struct BucketManager {
    store: Arc<dyn BlobStore>,
    skip_check: bool,
}

impl BucketManager {
    pub fn new(store: Arc<dyn BlobStore>, skip_check: bool) -> Self {
        BucketManager { store, skip_check }
    }

    /// Make sure the bucket exists and is publicly readable on the category prefixes.
    ///
    /// An existing bucket is never modified; a policy that does not grant public read is
    /// only reported. A missing bucket is created and the generated policy attached.
    pub async fn ensure_bucket(&self) -> StorageResult<BucketStatus> {
        let bucket = self.store.bucket().to_string();

        if self.skip_check {
            tracing::warn!(bucket = %bucket, "{}", skipped_check_notice(&bucket));
            return Ok(BucketStatus::Skipped);
        }

        let exists = self.store.bucket_exists().await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, "Bucket existence check failed");
            StorageError::BucketUnavailable(e.to_string())
        })?;

        if exists {
            tracing::info!(bucket = %bucket, "Bucket exists");
            self.audit_policy(&bucket).await;
            return Ok(BucketStatus::Existing);
        }

        self.store.create_bucket().await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, "Bucket creation failed");
            match e {
                StorageError::BucketCreation(msg) => StorageError::BucketCreation(msg),
                other => StorageError::BucketCreation(other.to_string()),
            }
        })?;

        let policy = public_read_policy(&bucket);
        self.store.set_bucket_policy(&policy).await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, "Applying bucket policy failed");
            match e {
                StorageError::BucketPolicy(msg) => StorageError::BucketPolicy(msg),
                other => StorageError::BucketPolicy(other.to_string()),
            }
        })?;

        tracing::info!(bucket = %bucket, "Bucket created with public-read policy");
        Ok(BucketStatus::Created)
    }

    /// Verify the bucket is reachable, for health checks.
    pub async fn bucket_exists(&self) -> StorageResult<()> {
        let bucket = self.store.bucket();
        match self.store.bucket_exists().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StorageError::BucketUnavailable(format!(
                "bucket {} does not exist",
                bucket
            ))),
            Err(e) => Err(StorageError::BucketUnavailable(e.to_string())),
        }
    }

    /// Warn when an existing bucket's policy would leave returned URLs unreadable.
    async fn audit_policy(&self, bucket: &str) {
        match self.store.get_bucket_policy().await {
            Ok(Some(document)) => {
                let missing = missing_public_read(&document, bucket);
                if !missing.is_empty() {
                    tracing::warn!(
                        bucket = %bucket,
                        missing = ?missing,
                        "Bucket policy does not grant public read on every category prefix"
                    );
                }
            }
            Ok(None) => tracing::warn!(
                bucket = %bucket,
                "Bucket has no policy; stored object URLs will not be publicly readable"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                bucket = %bucket,
                "Could not read bucket policy"
            ),
        }
    }
}
