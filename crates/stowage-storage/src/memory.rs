use crate::traits::{BlobStore, ObjectPage, StorageError, StorageResult, MAX_KEYS_PER_REQUEST};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Blob store operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOperation {
    BucketExists,
    CreateBucket,
    GetBucketPolicy,
    SetBucketPolicy,
    PutObject,
    ListObjects,
    DeleteObject,
    DeleteObjects,
}

/// An object held by [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    bucket_exists: bool,
    policy: Option<String>,
    objects: BTreeMap<String, StoredObject>,
    failing: HashSet<MemoryOperation>,
    calls: HashMap<MemoryOperation, usize>,
}

/// In-process blob store
///
/// Behaves like a single S3 bucket: keys are listed in lexicographic order, listing is
/// paginated with the last returned key as continuation token, and deleting an absent
/// key succeeds. Used for tests and local development.
#[derive(Clone)]
pub struct MemoryBlobStore {
    bucket: String,
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryBlobStore {
    /// Create a store whose bucket does not exist yet
    pub fn new(bucket: impl Into<String>) -> Self {
        MemoryBlobStore {
            bucket: bucket.into(),
            state: Arc::new(RwLock::new(MemoryState::default())),
        }
    }

    /// Create a store whose bucket already exists (without a policy)
    pub fn with_bucket(bucket: impl Into<String>) -> Self {
        let store = Self::new(bucket);
        if let Ok(mut state) = store.state.try_write() {
            state.bucket_exists = true;
        }
        store
    }

    /// Make every subsequent call of `operation` fail with a backend error
    pub async fn fail_operation(&self, operation: MemoryOperation) {
        self.state.write().await.failing.insert(operation);
    }

    /// Stop injecting failures for `operation`
    pub async fn heal_operation(&self, operation: MemoryOperation) {
        self.state.write().await.failing.remove(&operation);
    }

    /// Number of times `operation` has been invoked
    pub async fn call_count(&self, operation: MemoryOperation) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.state.read().await.objects.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.state.read().await.objects.keys().cloned().collect()
    }

    pub async fn policy(&self) -> Option<String> {
        self.state.read().await.policy.clone()
    }

    /// Record the call and fail it if a failure was injected
    fn enter(&self, state: &mut MemoryState, operation: MemoryOperation) -> StorageResult<()> {
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(&operation) {
            return Err(StorageError::BackendError(format!(
                "injected failure for {:?} on bucket {}",
                operation, self.bucket
            )));
        }
        Ok(())
    }

    fn require_bucket(&self, state: &MemoryState) -> StorageResult<()> {
        if state.bucket_exists {
            Ok(())
        } else {
            Err(StorageError::BucketUnavailable(format!(
                "bucket {} does not exist",
                self.bucket
            )))
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::BucketExists)?;
        Ok(state.bucket_exists)
    }

    async fn create_bucket(&self) -> StorageResult<()> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::CreateBucket)
            .map_err(|e| StorageError::BucketCreation(e.to_string()))?;
        if state.bucket_exists {
            return Err(StorageError::BucketCreation(format!(
                "bucket {} already exists",
                self.bucket
            )));
        }
        state.bucket_exists = true;
        Ok(())
    }

    async fn get_bucket_policy(&self) -> StorageResult<Option<String>> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::GetBucketPolicy)?;
        self.require_bucket(&state)?;
        Ok(state.policy.clone())
    }

    async fn set_bucket_policy(&self, policy: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::SetBucketPolicy)
            .map_err(|e| StorageError::BucketPolicy(e.to_string()))?;
        self.require_bucket(&state)?;
        serde_json::from_str::<serde_json::Value>(policy)
            .map_err(|e| StorageError::BucketPolicy(format!("malformed policy: {}", e)))?;
        state.policy = Some(policy.to_string());
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<()> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::PutObject)
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        self.require_bucket(&state)?;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: usize,
    ) -> StorageResult<ObjectPage> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::ListObjects)
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;
        self.require_bucket(&state)?;

        let max_keys = max_keys.clamp(1, MAX_KEYS_PER_REQUEST);
        let start = match continuation_token {
            Some(token) => Bound::Excluded(token),
            None => Bound::Included(prefix.to_string()),
        };

        let mut matching = state
            .objects
            .range((start, Bound::Unbounded))
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(max_keys).cloned().collect();
        let truncated = matching.next().is_some();

        Ok(ObjectPage {
            next_continuation_token: if truncated { keys.last().cloned() } else { None },
            keys,
        })
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::DeleteObject)
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
        self.require_bucket(&state)?;
        state.objects.remove(key);
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        let mut state = self.state.write().await;
        self.enter(&mut state, MemoryOperation::DeleteObjects)
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
        self.require_bucket(&state)?;
        if keys.len() > MAX_KEYS_PER_REQUEST {
            return Err(StorageError::DeleteFailed(format!(
                "bulk delete of {} keys exceeds the limit of {}",
                keys.len(),
                MAX_KEYS_PER_REQUEST
            )));
        }
        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "storage-memory"))]
mod tests {
    use super::*;

    async fn put(store: &MemoryBlobStore, key: &str) {
        store
            .put_object(key, Bytes::from_static(b"data"), "application/pdf", &HashMap::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_put_and_read_back() {
        let store = MemoryBlobStore::with_bucket("b");
        let mut metadata = HashMap::new();
        metadata.insert("user-id".to_string(), "u1".to_string());

        store
            .put_object(
                "u1/resumes/cv.pdf",
                Bytes::from_static(b"%PDF"),
                "application/pdf",
                &metadata,
            )
            .await
            .unwrap();

        let object = store.object("u1/resumes/cv.pdf").await.unwrap();
        assert_eq!(object.data, Bytes::from_static(b"%PDF"));
        assert_eq!(object.content_type, "application/pdf");
        assert_eq!(object.metadata.get("user-id").map(String::as_str), Some("u1"));
    }

    #[tokio::test]
    async fn test_operations_require_bucket() {
        let store = MemoryBlobStore::new("b");
        assert!(!store.bucket_exists().await.unwrap());
        let result = store
            .put_object("k", Bytes::new(), "image/png", &HashMap::new())
            .await;
        assert!(matches!(result, Err(StorageError::BucketUnavailable(_))));

        store.create_bucket().await.unwrap();
        assert!(store.bucket_exists().await.unwrap());
        assert!(matches!(
            store.create_bucket().await,
            Err(StorageError::BucketCreation(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_pages_and_prefix_isolation() {
        let store = MemoryBlobStore::with_bucket("b");
        for key in ["a/1", "a/2", "a/3", "ab/1", "b/1"] {
            put(&store, key).await;
        }

        let first = store.list_objects_page("a/", None, 2).await.unwrap();
        assert_eq!(first.keys, vec!["a/1", "a/2"]);
        assert_eq!(first.next_continuation_token.as_deref(), Some("a/2"));

        let second = store
            .list_objects_page("a/", first.next_continuation_token, 2)
            .await
            .unwrap();
        assert_eq!(second.keys, vec!["a/3"]);
        assert_eq!(second.next_continuation_token, None);
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let store = MemoryBlobStore::with_bucket("b");
        store.delete_object("nope").await.unwrap();
        store.delete_objects(&["nope".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failures_and_call_counts() {
        let store = MemoryBlobStore::with_bucket("b");
        store.fail_operation(MemoryOperation::PutObject).await;
        let result = store
            .put_object("k", Bytes::new(), "image/png", &HashMap::new())
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert_eq!(store.call_count(MemoryOperation::PutObject).await, 1);

        store.heal_operation(MemoryOperation::PutObject).await;
        put(&store, "k").await;
        assert_eq!(store.keys().await, vec!["k"]);
    }

    #[tokio::test]
    async fn test_policy_must_be_json() {
        let store = MemoryBlobStore::with_bucket("b");
        assert!(store.set_bucket_policy("{").await.is_err());
        store.set_bucket_policy("{}").await.unwrap();
        assert_eq!(store.policy().await.as_deref(), Some("{}"));
    }
}
