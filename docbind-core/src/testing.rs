//! Test doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use std::sync::{
    LazyLock, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    attribute::{AttributeOptions, AttributeRegistry, IndexOrder},
    backend::StoreBackend,
    error::{StoreError, StoreResult},
    index::IndexKey,
    query::{Expr, FieldOp, Query},
    resource::{Entity, ID_FIELD, Resource},
};

/// Stub backend recording index requests. Filters support equality and conjunction only.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    documents: Mutex<Vec<Document>>,
    ensured: Mutex<Vec<(String, Vec<IndexKey>)>>,
    fail_ensure: AtomicBool,
    find_calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensured_indices(&self) -> Vec<(String, Vec<IndexKey>)> {
        self.ensured.lock().unwrap().clone()
    }

    pub fn fail_next_ensure(&self) {
        self.fail_ensure.store(true, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn matching(&self, query: &Query) -> Vec<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|document| query.filter.as_ref().is_none_or(|expr| matches(document, expr)))
            .cloned()
            .collect()
    }
}

fn matches(document: &Document, expr: &Expr) -> bool {
    match expr {
        Expr::And(exprs) => exprs.iter().all(|expr| matches(document, expr)),
        Expr::Field { field, op: FieldOp::Eq, value } => document.get(field) == Some(value),
        other => unimplemented!("unsupported filter {other:?}"),
    }
}

#[async_trait]
impl StoreBackend for RecordingBackend {
    async fn insert_document(&self, mut document: Document, _collection: &str) -> StoreResult<ObjectId> {
        let id = ObjectId::new();
        document.insert(ID_FIELD, id);
        self.documents.lock().unwrap().push(document);

        Ok(id)
    }

    async fn update_document(&self, id: ObjectId, mut document: Document, collection: &str) -> StoreResult<()> {
        let mut documents = self.documents.lock().unwrap();
        let stored = documents
            .iter_mut()
            .find(|stored| stored.get(ID_FIELD) == Some(&Bson::ObjectId(id)))
            .ok_or_else(|| StoreError::DocumentNotFound(id.to_hex(), collection.to_string()))?;

        document.insert(ID_FIELD, id);
        *stored = document;

        Ok(())
    }

    async fn find_documents(&self, query: Query, _collection: &str) -> StoreResult<Vec<Document>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .matching(&query)
            .into_iter()
            .skip(query.skip.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(&self, query: Query, _collection: &str) -> StoreResult<u64> {
        Ok(query.paginate_count(self.matching(&query).len()) as u64)
    }

    async fn ensure_index(&self, keys: Vec<IndexKey>, collection: &str) -> StoreResult<()> {
        if self.fail_ensure.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("index creation refused".into()));
        }

        self.ensured
            .lock()
            .unwrap()
            .push((collection.to_string(), keys));

        Ok(())
    }

    async fn drop_collection(&self, _collection: &str) -> StoreResult<()> {
        self.documents.lock().unwrap().clear();
        Ok(())
    }
}

/// Resource with two indexed attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    entity: Entity,
}

impl Resource for Widget {
    fn collection_name() -> &'static str {
        "widgets"
    }

    fn registry() -> &'static AttributeRegistry {
        static REGISTRY: LazyLock<AttributeRegistry> = LazyLock::new(|| {
            let mut registry = AttributeRegistry::new();
            registry
                .declare("name", AttributeOptions::new().indexed())
                .declare("rank", AttributeOptions::new().indexed().order(IndexOrder::Descending))
                .declare("at", AttributeOptions::new());
            registry
        });

        &REGISTRY
    }

    fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

/// Resource without indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Plain {
    entity: Entity,
}

impl Resource for Plain {
    fn collection_name() -> &'static str {
        "plains"
    }

    fn registry() -> &'static AttributeRegistry {
        static REGISTRY: LazyLock<AttributeRegistry> = LazyLock::new(|| {
            let mut registry = AttributeRegistry::new();
            registry.declare("label", AttributeOptions::new());
            registry
        });

        &REGISTRY
    }

    fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}
