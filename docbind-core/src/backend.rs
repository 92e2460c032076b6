//! Storage backend abstraction.
//!
//! The [`StoreBackend`] trait is the whole contract this crate needs from a document store:
//! insert a document and learn its identifier, replace a document by identifier, find and
//! count documents for a [`Query`], and ensure a compound index. Connection handling, wire
//! formats and cursors stay inside the implementation.
//!
//! # Examples
//!
//! ```ignore
//! use docbind::backend::StoreBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//! let id = backend.insert_document(doc! { "name": "Alice" }, "users").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{error::StoreResult, index::IndexKey, query::Query};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single backend is shared by every resource
/// type of a [`ResourceStore`](crate::store::ResourceStore).
///
/// # Error Handling
///
/// Driver and connectivity failures are reported as
/// [`StoreError::Backend`](crate::error::StoreError::Backend) and are never retried by the
/// caller. Queries that match nothing are successes with empty results.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a new document and returns the identifier assigned to it.
    ///
    /// The document never carries an `_id`; the backend generates one.
    async fn insert_document(
        &self,
        document: Document,
        collection: &str,
    ) -> StoreResult<ObjectId>;

    /// Replaces the stored document with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`](crate::error::StoreError::DocumentNotFound)
    /// if no such document is stored.
    async fn update_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<()>;

    /// Returns the documents matching `query`, honoring its sort, `skip` and `limit`.
    ///
    /// Returned documents include their `_id`.
    async fn find_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<Vec<Document>>;

    /// Counts the documents matching `query`, honoring its `skip` and `limit`.
    async fn count_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Ensures a compound index over `keys` exists. Must be idempotent.
    async fn ensure_index(
        &self,
        keys: Vec<IndexKey>,
        collection: &str,
    ) -> StoreResult<()>;

    /// Drops a collection together with its documents and indices.
    ///
    /// Dropping a collection that does not exist succeeds.
    async fn drop_collection(&self, collection: &str) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_document(
        &self,
        document: Document,
        collection: &str,
    ) -> StoreResult<ObjectId> {
        (*self)
            .insert_document(document, collection)
            .await
    }

    async fn update_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<()> {
        (*self)
            .update_document(id, document, collection)
            .await
    }

    async fn find_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<Vec<Document>> {
        (*self)
            .find_documents(query, collection)
            .await
    }

    async fn count_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> StoreResult<u64> {
        (*self)
            .count_documents(query, collection)
            .await
    }

    async fn ensure_index(
        &self,
        keys: Vec<IndexKey>,
        collection: &str,
    ) -> StoreResult<()> {
        (*self)
            .ensure_index(keys, collection)
            .await
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        (*self).drop_collection(collection).await
    }
}

/// Factory for configured backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
