use crate::traits::{BlobStore, ObjectPage, StorageError, StorageResult, MAX_KEYS_PER_REQUEST};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::collections::HashMap;

/// S3 blob store implementation
///
/// Works against AWS S3 and S3-compatible providers (MinIO, Cloudflare R2,
/// DigitalOcean Spaces). The client is built once and is safe for concurrent use.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - Bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers,
    ///   e.g. "auto" for R2)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional static access key / secret key pair. When absent the
    ///   default AWS credential chain is used.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<(String, String)>,
    ) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config);

        if let Some((access_key, secret_key)) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "stowage-static",
            ));
        }

        let sdk_config = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing is required by MinIO and most S3-compatible providers
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(s3_config.build());

        tracing::debug!(
            bucket = %bucket,
            region = %region,
            endpoint = ?endpoint_url,
            "S3 client configured"
        );

        Ok(S3BlobStore {
            client,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Location constraint for bucket creation. AWS rejects an explicit `us-east-1`;
    /// custom endpoints and the `auto` region take none.
    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        if self.endpoint_url.is_some() || self.region == "us-east-1" || self.region == "auto" {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadBucketError::NotFound(_) => Ok(false),
                    _ if service_err.raw().status().as_u16() == 404 => Ok(false),
                    _ => Err(StorageError::BucketUnavailable(
                        DisplayErrorContext(&e).to_string(),
                    )),
                },
                _ => Err(StorageError::BucketUnavailable(
                    DisplayErrorContext(&e).to_string(),
                )),
            },
        }
    }

    async fn create_bucket(&self) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let result = self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .set_create_bucket_configuration(self.location_constraint())
            .send()
            .await;

        match result {
            Ok(_) => {}
            // Another instance won the creation race
            Err(SdkError::ServiceError(ref service_err))
                if matches!(
                    service_err.err(),
                    CreateBucketError::BucketAlreadyOwnedByYou(_)
                ) =>
            {
                tracing::debug!(bucket = %self.bucket, "Bucket already owned by this account");
            }
            Err(e) => {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 bucket creation failed"
                );
                return Err(StorageError::BucketCreation(
                    DisplayErrorContext(&e).to_string(),
                ));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bucket created"
        );
        Ok(())
    }

    async fn get_bucket_policy(&self) -> StorageResult<Option<String>> {
        match self
            .client
            .get_bucket_policy()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(output) => Ok(output.policy().map(str::to_string)),
            Err(e) => {
                let code = e.as_service_error().and_then(|se| se.code());
                if code == Some("NoSuchBucketPolicy") {
                    return Ok(None);
                }
                Err(StorageError::BucketPolicy(
                    DisplayErrorContext(&e).to_string(),
                ))
            }
        }
    }

    async fn set_bucket_policy(&self, policy: &str) -> StorageResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(&self.bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    "S3 put bucket policy failed"
                );
                StorageError::BucketPolicy(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(bucket = %self.bucket, "S3 bucket policy applied");
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<()> {
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .set_metadata(Some(metadata.clone()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: usize,
    ) -> StorageResult<ObjectPage> {
        let max_keys = max_keys.clamp(1, MAX_KEYS_PER_REQUEST) as i32;

        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    prefix = %prefix,
                    "S3 list failed"
                );
                StorageError::ListFailed(DisplayErrorContext(&e).to_string())
            })?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        Ok(ObjectPage {
            keys,
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let start = std::time::Instant::now();

        for chunk in keys.chunks(MAX_KEYS_PER_REQUEST) {
            let identifiers = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

            let delete = Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
                .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %DisplayErrorContext(&e),
                        bucket = %self.bucket,
                        key_count = chunk.len(),
                        "S3 bulk delete failed"
                    );
                    StorageError::DeleteFailed(DisplayErrorContext(&e).to_string())
                })?;

            // Per-key failures come back in a successful response
            if let Some(first) = output.errors().first() {
                tracing::error!(
                    bucket = %self.bucket,
                    failed_count = output.errors().len(),
                    key = first.key().unwrap_or_default(),
                    code = first.code().unwrap_or_default(),
                    "S3 bulk delete partially failed"
                );
                return Err(StorageError::DeleteFailed(format!(
                    "{} of {} keys not deleted, first: {} ({})",
                    output.errors().len(),
                    chunk.len(),
                    first.key().unwrap_or_default(),
                    first.message().unwrap_or_default()
                )));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key_count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bulk delete successful"
        );

        Ok(())
    }
}
