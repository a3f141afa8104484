//! Test helpers: fixtures and a service backed by the in-memory blob store.
//!
//! Run from workspace root: `cargo test -p stowage-services`.

pub mod fixtures;

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use stowage_services::{BlobStore, MemoryBlobStore, ObjectService};

pub const TEST_BUCKET: &str = "stowage-test";
pub const TEST_BASE_URL: &str = "https://cdn.example.com/uploads/";

/// Service over a store whose bucket already exists.
pub fn setup_service() -> (ObjectService, MemoryBlobStore) {
    let store = MemoryBlobStore::with_bucket(TEST_BUCKET);
    let service = ObjectService::new(Arc::new(store.clone()), TEST_BASE_URL, false);
    (service, store)
}

/// Service over a store whose bucket has not been created yet.
pub fn setup_service_without_bucket(skip_bucket_check: bool) -> (ObjectService, MemoryBlobStore) {
    let store = MemoryBlobStore::new(TEST_BUCKET);
    let service = ObjectService::new(Arc::new(store.clone()), TEST_BASE_URL, skip_bucket_check);
    (service, store)
}

/// Write `count` placeholder objects named `{prefix}{i}.pdf`.
pub async fn seed_objects(store: &MemoryBlobStore, prefix: &str, count: usize) {
    for i in 0..count {
        store
            .put_object(
                &format!("{}{:05}.pdf", prefix, i),
                Bytes::from_static(b"%PDF-1.4"),
                "application/pdf",
                &HashMap::new(),
            )
            .await
            .expect("seeding object failed");
    }
}

/// Keys currently stored under `prefix`.
pub async fn keys_under(store: &MemoryBlobStore, prefix: &str) -> Vec<String> {
    store
        .keys()
        .await
        .into_iter()
        .filter(|k| k.starts_with(prefix))
        .collect()
}
