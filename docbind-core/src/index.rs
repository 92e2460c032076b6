//! Amortized index creation for resource types.
//!
//! Every query-producing operation on a resource type first calls
//! [`IndexManager::ensure_indices`]. The first call per type issues a single backend
//! `ensure_index` request carrying all indexed attributes; later calls are no-ops. A failed
//! request is not remembered, so the next query retries it.
//!
//! Concurrent first queries may both reach the backend. Backends treat `ensure_index` as
//! idempotent, so the race only costs a redundant request.

use mea::rwlock::RwLock;
use std::{any::TypeId, collections::HashSet};
use tracing::debug;

use crate::{
    attribute::IndexOrder,
    backend::StoreBackend,
    error::StoreResult,
    resource::Resource,
};

/// A single key of a compound index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub field: String,
    pub order: IndexOrder,
}

impl IndexKey {
    pub fn new(field: impl Into<String>, order: IndexOrder) -> Self {
        Self { field: field.into(), order }
    }
}

/// Side table of resource types whose indices have been ensured.
#[derive(Debug, Default)]
pub struct IndexManager {
    ensured: RwLock<HashSet<TypeId>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self {
            ensured: RwLock::new(HashSet::new()),
        }
    }

    /// Ensures the indices of `R` exist, at most once per manager.
    ///
    /// # Errors
    ///
    /// Propagates the backend error unchanged; the type stays unensured.
    pub async fn ensure_indices<R, B>(&self, backend: &B) -> StoreResult<()>
    where
        R: Resource,
        B: StoreBackend,
    {
        if self.is_ensured::<R>().await {
            return Ok(());
        }

        let keys = R::registry().index_keys();

        if !keys.is_empty() {
            debug!(collection = R::collection_name(), keys = keys.len(), "ensuring indices");

            backend
                .ensure_index(keys, R::collection_name())
                .await?;
        }

        self.ensured
            .write()
            .await
            .insert(TypeId::of::<R>());

        Ok(())
    }

    pub async fn is_ensured<R: Resource>(&self) -> bool {
        self.ensured
            .read()
            .await
            .contains(&TypeId::of::<R>())
    }

    /// Forgets that the indices of `R` were ensured, e.g. after its collection was dropped.
    pub async fn reset<R: Resource>(&self) {
        self.ensured
            .write()
            .await
            .remove(&TypeId::of::<R>());
    }
}
