//! In-memory storage implementation for resource stores.
//!
//! Documents are kept per collection in insertion order, keyed by their object id, behind
//! an async-safe read-write lock.

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use tracing::trace;

use docbind_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    index::IndexKey,
    query::{Query, SortDirection},
    resource::ID_FIELD,
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type CollectionMap = IndexMap<ObjectId, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing it to be
/// safely shared across async tasks. Clones share the same underlying data.
///
/// # Performance
///
/// Queries scan every document of a collection; index requests are accepted and ignored.
///
/// # Example
///
/// ```ignore
/// use docbind_memory::InMemoryStore;
/// use docbind::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document(doc! { "name": "Alice" }, "users").await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> (document id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the documents of `collection` matching `query`'s filter, in insertion order.
    async fn matching(&self, query: &Query, collection: &str) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(collection_map.values(), filter),
            None => Ok(collection_map
                .values()
                .cloned()
                .collect()),
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, mut document: Document, collection: &str) -> StoreResult<ObjectId> {
        let id = ObjectId::new();
        document.insert(ID_FIELD, id);

        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, document);

        trace!(collection, %id, "inserted document");

        Ok(id)
    }

    async fn update_document(&self, id: ObjectId, mut document: Document, collection: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let Some(stored) = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(&id))
        else {
            return Err(StoreError::DocumentNotFound(id.to_hex(), collection.to_string()));
        };

        document.insert(ID_FIELD, id);
        *stored = document;

        trace!(collection, %id, "replaced document");

        Ok(())
    }

    async fn find_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = self.matching(&query, collection).await?;

        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| {
                let left = a
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = b
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        trace!(collection, matching = documents.len(), "queried documents");

        Ok(documents
            .into_iter()
            .skip(query.skip.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        let matching = self.matching(&query, collection).await?.len();

        Ok(query.paginate_count(matching) as u64)
    }

    async fn ensure_index(&self, keys: Vec<IndexKey>, collection: &str) -> StoreResult<()> {
        trace!(collection, keys = keys.len(), "ignoring index request");

        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .remove(collection);

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use docbind_memory::InMemoryStore;
/// use docbind::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().build().await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
