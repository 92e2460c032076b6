#![allow(dead_code)]

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use docbind::{index::IndexKey, memory::InMemoryStore, prelude::*};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Resource)]
#[resource(collection = "testresources")]
#[attribute(first, index)]
#[attribute(second, index, order = "ascending")]
#[attribute(third, finder = "find_by_third_attribute")]
pub struct TestResource {
    entity: Entity,
}

#[derive(Debug, Clone, PartialEq, Resource)]
#[attribute(first)]
#[attribute(at)]
pub struct TestTimedResource {
    entity: Entity,
}

/// In-memory backend counting index requests and refusing the first `failures` of them.
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: InMemoryStore,
    ensure_calls: AtomicUsize,
    failures: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreBackend for CountingBackend {
    async fn insert_document(&self, document: Document, collection: &str) -> StoreResult<ObjectId> {
        self.inner.insert_document(document, collection).await
    }

    async fn update_document(&self, id: ObjectId, document: Document, collection: &str) -> StoreResult<()> {
        self.inner.update_document(id, document, collection).await
    }

    async fn find_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        self.inner.find_documents(query, collection).await
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        self.inner.count_documents(query, collection).await
    }

    async fn ensure_index(&self, keys: Vec<IndexKey>, collection: &str) -> StoreResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);

        let refuse = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if refuse {
            return Err(StoreError::Backend("index creation refused".into()));
        }

        self.inner.ensure_index(keys, collection).await
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.inner.drop_collection(collection).await
    }
}

pub fn memory_store() -> ResourceStore<InMemoryStore> {
    ResourceStore::new(InMemoryStore::new())
}

pub fn numbered(index: usize) -> Fields {
    fields! {
        "first" => format!("{index}_first"),
        "second" => format!("{index}_second"),
        "third" => format!("{index}_third"),
    }
}

pub async fn seed(resources: &Resources<'_, InMemoryStore, TestResource>, count: usize) {
    for index in 0..count {
        let resource = resources.create(numbered(index)).await.unwrap();
        assert!(resource.is_persisted());
    }
}
