//! Lazily materialized collections of resources.
//!
//! A [`LazyCollection`] wraps either a [`Query`] against a backend or an explicit list of
//! resources. Nothing is fetched until the collection is forced by [`each`], [`to_a`],
//! [`size`] or another materializing call; the result is cached and every later call reuses
//! it, so iterating twice (or interleaving partial iteration with `to_a`) never queries the
//! backend again.
//!
//! Collections compose: [`merge`] and `+` build an explicit collection holding the elements
//! of both operands without touching either, [`merge_in_place`] appends into the receiver's
//! own cache.
//!
//! ```ignore
//! let mut firsts = accounts.find(fields! { "first" => "first" }, FindOptions::default()).await?;
//! let mut seconds = accounts.find(fields! { "second" => "second" }, FindOptions::default()).await?;
//!
//! let mut both = firsts.merge(&seconds).await?;
//! assert_eq!(both.size().await?, firsts.size().await? + seconds.size().await?);
//! ```
//!
//! [`each`]: LazyCollection::each
//! [`to_a`]: LazyCollection::to_a
//! [`size`]: LazyCollection::size
//! [`merge`]: LazyCollection::merge
//! [`merge_in_place`]: LazyCollection::merge_in_place

use futures::future::BoxFuture;
use std::{fmt, ops::Add, slice};

use crate::{
    backend::StoreBackend,
    error::StoreResult,
    query::Query,
    resource::{Entity, Resource},
};

enum Source<'a, B: StoreBackend> {
    Query { backend: &'a B, query: Query },
    /// Elements live in the collection's cache.
    Explicit,
}

impl<'a, B: StoreBackend> Clone for Source<'a, B> {
    fn clone(&self) -> Self {
        match self {
            Source::Query { backend, query } => Source::Query {
                backend: *backend,
                query: query.clone(),
            },
            Source::Explicit => Source::Explicit,
        }
    }
}

impl<'a, B: StoreBackend> fmt::Debug for Source<'a, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Query { query, .. } => f.debug_tuple("Query").field(query).finish(),
            Source::Explicit => f.write_str("Explicit"),
        }
    }
}

/// A query result (or explicit element list) with deferred, repeatable materialization.
pub struct LazyCollection<'a, B: StoreBackend, R: Resource> {
    source: Source<'a, B>,
    materialized: Option<Vec<R>>,
}

impl<'a, B: StoreBackend, R: Resource> LazyCollection<'a, B, R> {
    pub(crate) fn from_query(backend: &'a B, query: Query) -> Self {
        Self {
            source: Source::Query { backend, query },
            materialized: None,
        }
    }

    /// Creates a collection over an explicit list of resources. It never queries a backend.
    pub fn from_resources(resources: Vec<R>) -> Self {
        Self {
            source: Source::Explicit,
            materialized: Some(resources),
        }
    }

    /// The query backing this collection, if it is query-backed.
    pub fn query(&self) -> Option<&Query> {
        match &self.source {
            Source::Query { query, .. } => Some(query),
            _ => None,
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized.is_some()
    }

    /// Iterates the materialized elements, fetching them first if needed.
    pub async fn each(&mut self) -> StoreResult<slice::Iter<'_, R>> {
        Ok(self.to_a().await?.iter())
    }

    /// Returns the materialized elements, fetching them on the first call only.
    pub async fn to_a(&mut self) -> StoreResult<&[R]> {
        if self.materialized.is_none() {
            let resources = self.fetch().await?;
            self.materialized = Some(resources);
        }

        Ok(self.materialized.as_deref().unwrap_or_default())
    }

    pub async fn first(&mut self) -> StoreResult<Option<&R>> {
        Ok(self.to_a().await?.first())
    }

    /// Number of elements this collection yields.
    ///
    /// Forces materialization, so the query's `skip` and `limit` are reflected.
    pub async fn size(&mut self) -> StoreResult<usize> {
        Ok(self.to_a().await?.len())
    }

    pub async fn is_empty(&mut self) -> StoreResult<bool> {
        Ok(self.size().await? == 0)
    }

    /// Backend count honoring the query's `skip` and `limit`.
    pub async fn count(&self) -> StoreResult<usize> {
        self.count_with_pagination(true).await
    }

    /// Backend count of the query's filter; `skip` and `limit` are ignored unless
    /// `apply_pagination` is set. Explicit collections count their elements.
    pub fn count_with_pagination(&self, apply_pagination: bool) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(self.count_source(apply_pagination))
    }

    /// Whether an element with the same identity is present.
    ///
    /// Persisted resources match by identifier, unpersisted ones by field equality.
    pub async fn contains(&mut self, resource: &R) -> StoreResult<bool> {
        let needle = resource.entity();

        Ok(self
            .to_a()
            .await?
            .iter()
            .any(|candidate| same_entity(candidate.entity(), needle)))
    }

    /// Copies the elements without populating the cache.
    ///
    /// Returns the cached elements when already materialized, otherwise fetches a fresh
    /// copy and leaves this collection untouched.
    pub async fn snapshot(&self) -> StoreResult<Vec<R>> {
        self.fetch().await
    }

    /// Returns a new explicit collection holding the elements of `self` followed by those
    /// of `other`. Neither operand is modified.
    pub async fn merge(&self, other: &Self) -> StoreResult<Self> {
        let mut resources = self.snapshot().await?;
        resources.extend(other.snapshot().await?);

        Ok(Self::from_resources(resources))
    }

    /// Appends the elements of `other` to this collection's own materialized set.
    pub async fn merge_in_place(&mut self, other: &Self) -> StoreResult<&mut Self> {
        let appended = other.snapshot().await?;

        self.to_a().await?;
        self.materialized
            .get_or_insert_with(Vec::new)
            .extend(appended);

        Ok(self)
    }

    /// Serializes the elements as a JSON array of their field mappings.
    pub async fn to_json(&mut self) -> StoreResult<String> {
        let hashes = self
            .to_a()
            .await?
            .iter()
            .map(R::to_hash)
            .collect::<Vec<_>>();

        Ok(serde_json::to_string(&hashes)?)
    }

    /// Consumes the collection, returning its elements.
    pub async fn into_vec(mut self) -> StoreResult<Vec<R>> {
        self.to_a().await?;

        Ok(self.materialized.unwrap_or_default())
    }

    fn fetch(&self) -> BoxFuture<'_, StoreResult<Vec<R>>> {
        Box::pin(self.fetch_source())
    }

    async fn fetch_source(&self) -> StoreResult<Vec<R>> {
        if let Some(resources) = &self.materialized {
            return Ok(resources.clone());
        }

        match &self.source {
            Source::Query { backend, query } => backend
                .find_documents(query.clone(), R::collection_name())
                .await?
                .into_iter()
                .map(|document| Entity::from_document(document).map(R::from_entity))
                .collect(),
            Source::Explicit => Ok(Vec::new()),
        }
    }

    async fn count_source(&self, apply_pagination: bool) -> StoreResult<usize> {
        match (&self.source, &self.materialized) {
            (Source::Query { backend, query }, _) => {
                let query = if apply_pagination {
                    query.clone()
                } else {
                    query.without_pagination()
                };

                let count = backend
                    .count_documents(query, R::collection_name())
                    .await?;

                Ok(count as usize)
            }
            (_, Some(resources)) => Ok(resources.len()),
            (Source::Explicit, None) => Ok(0),
        }
    }
}

fn same_entity(left: &Entity, right: &Entity) -> bool {
    match (left.id(), right.id()) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

impl<'a, B: StoreBackend, R: Resource> Clone for LazyCollection<'a, B, R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            materialized: self.materialized.clone(),
        }
    }
}

impl<'a, B: StoreBackend, R: Resource> fmt::Debug for LazyCollection<'a, B, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCollection")
            .field("source", &self.source)
            .field("materialized", &self.materialized)
            .finish()
    }
}

/// Owned form of [`LazyCollection::merge`].
///
/// Resolves to an explicit collection of the left elements followed by the right ones.
/// Both operands are forced when the returned future is awaited; the result never queries
/// the backend again.
///
/// ```ignore
/// let mut both = (firsts + seconds).await?;
/// ```
impl<'a, B: StoreBackend, R: Resource> Add for LazyCollection<'a, B, R> {
    type Output = BoxFuture<'a, StoreResult<Self>>;

    fn add(self, rhs: Self) -> Self::Output {
        Box::pin(async move {
            let mut resources = self.into_vec().await?;
            resources.extend(rhs.into_vec().await?);

            Ok(Self::from_resources(resources))
        })
    }
}
