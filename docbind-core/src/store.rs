//! Resource store: the entry point binding resource types to a backend.
//!
//! A [`ResourceStore`] owns the backend (the "connection") and the per-type index state.
//! [`ResourceStore::resources`] hands out a [`Resources`] handle exposing the class-level
//! operations of one resource type: constructing, saving, point lookups and queries.
//!
//! # Example
//!
//! ```ignore
//! use docbind::prelude::*;
//!
//! let store = ResourceStore::new(InMemoryStore::new());
//! let accounts = store.resources::<Account>();
//!
//! let account = accounts.create(fields! { "first" => "first" }).await?;
//! let found = accounts.get(account.id().unwrap()).await?;
//! let everything = accounts.all(FindOptions::new().limit(10)).await?;
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use std::marker::PhantomData;
use tracing::debug;

use crate::{
    backend::StoreBackend,
    collection::LazyCollection,
    error::{StoreError, StoreResult},
    index::IndexManager,
    normalize::sanitize_key,
    query::{Expr, Filter, FindOptions, Query},
    resource::{Entity, ID_FIELD, IntoResourceId, Resource},
    value::{Fields, Value},
};

/// A store bound to a specific backend implementation.
#[derive(Debug)]
pub struct ResourceStore<B: StoreBackend> {
    backend: B,
    indexes: IndexManager,
}

impl<B: StoreBackend> ResourceStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            indexes: IndexManager::new(),
        }
    }

    /// Returns the backend every resource type of this store talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn index_manager(&self) -> &IndexManager {
        &self.indexes
    }

    /// Gets the class-level operations of resource type `R`.
    pub fn resources<R: Resource>(&self) -> Resources<'_, B, R> {
        Resources::bind(self)
    }

    /// Drops the collection of `R`.
    ///
    /// Indices go with the collection, so the next query ensures them again.
    pub async fn drop_collection<R: Resource>(&self) -> StoreResult<()> {
        self.backend
            .drop_collection(R::collection_name())
            .await?;
        self.indexes.reset::<R>().await;

        Ok(())
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

/// Class-level operations of resource type `R`.
#[derive(Debug)]
pub struct Resources<'a, B: StoreBackend, R: Resource> {
    store: &'a ResourceStore<B>,
    _marker: PhantomData<R>,
}

impl<'a, B: StoreBackend, R: Resource> Clone for Resources<'a, B, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: StoreBackend, R: Resource> Copy for Resources<'a, B, R> {}

impl<'a, B: StoreBackend, R: Resource> Resources<'a, B, R> {
    pub(crate) fn bind(store: &'a ResourceStore<B>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn collection_name(&self) -> &'static str {
        R::collection_name()
    }

    /// Ensures the indices of `R` exist. Every query-producing operation calls this.
    pub async fn ensure_indices(&self) -> StoreResult<()> {
        self.store
            .indexes
            .ensure_indices::<R, B>(&self.store.backend)
            .await
    }

    /// Creates an unpersisted resource from `fields`. Does not touch the backend.
    pub fn new(&self, fields: Fields) -> R {
        R::new(fields)
    }

    /// Creates a resource and saves it.
    pub async fn create(&self, fields: Fields) -> StoreResult<R> {
        let mut resource = R::new(fields);
        self.save(&mut resource).await?;

        Ok(resource)
    }

    /// Inserts an unpersisted resource or replaces a persisted one by identifier.
    ///
    /// On success the resource is persisted and carries its identifier. On failure it is
    /// left untouched.
    pub async fn save(&self, resource: &mut R) -> StoreResult<()> {
        self.ensure_indices().await?;

        let entity = resource.entity_mut();
        let document = entity.to_document();

        match entity.id().copied() {
            Some(id) if entity.is_persisted() => {
                debug!(collection = R::collection_name(), %id, "updating resource");

                self.store
                    .backend
                    .update_document(id, document, R::collection_name())
                    .await?;
                entity.mark_persisted(id);
            }
            _ => {
                let id = self
                    .store
                    .backend
                    .insert_document(document, R::collection_name())
                    .await?;

                debug!(collection = R::collection_name(), %id, "inserted resource");
                entity.mark_persisted(id);
            }
        }

        Ok(())
    }

    /// Fetches a resource by identifier, given natively or as a hex string.
    ///
    /// Returns `Ok(None)` when nothing matches or the identifier is malformed.
    pub async fn get(&self, id: impl IntoResourceId) -> StoreResult<Option<R>> {
        let Some(id) = id.into_resource_id() else {
            return Ok(None);
        };

        self.ensure_indices().await?;

        let query = Query::builder()
            .filter(Filter::eq(ID_FIELD, id))
            .limit(1)
            .build();

        self.store
            .backend
            .find_documents(query, R::collection_name())
            .await?
            .into_iter()
            .next()
            .map(|document| Entity::from_document(document).map(R::from_entity))
            .transpose()
    }

    /// Alias of [`get`](Self::get).
    pub async fn find_by_id(&self, id: impl IntoResourceId) -> StoreResult<Option<R>> {
        self.get(id).await
    }

    /// Returns the resources whose fields equal every entry of `filter`.
    ///
    /// Indices are ensured here, not when the collection is materialized.
    pub async fn find(&self, filter: Fields, options: FindOptions) -> StoreResult<LazyCollection<'a, B, R>> {
        self.query(Filter::from_fields(filter), options).await
    }

    /// Returns the resources matching a filter expression.
    pub async fn find_where(&self, filter: Expr, options: FindOptions) -> StoreResult<LazyCollection<'a, B, R>> {
        self.query(Some(filter), options).await
    }

    pub async fn all(&self, options: FindOptions) -> StoreResult<LazyCollection<'a, B, R>> {
        self.query(None, options).await
    }

    /// Single-field equality query on a declared attribute.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownAttribute`] if `R` declares no attribute `attribute`.
    pub async fn find_by(&self, attribute: &str, value: impl Into<Value>) -> StoreResult<LazyCollection<'a, B, R>> {
        let field = sanitize_key(attribute);

        if !R::registry().contains(&field) {
            return Err(StoreError::UnknownAttribute(attribute.to_string(), R::collection_name().to_string()));
        }

        self.query(Some(Filter::eq(field, value)), FindOptions::default())
            .await
    }

    /// Runs the finder registered under `finder`, e.g. `"find_by_third_attribute"`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownFinder`] if no attribute of `R` exposes that finder.
    pub async fn call_finder(&self, finder: &str, value: impl Into<Value>) -> StoreResult<LazyCollection<'a, B, R>> {
        let Some(descriptor) = R::registry().attribute_for_finder(finder) else {
            return Err(StoreError::UnknownFinder(finder.to_string(), R::collection_name().to_string()));
        };

        self.find_by(descriptor.name(), value).await
    }

    /// Returns the resources whose timestamp attribute falls on the UTC calendar day of `day`,
    /// i.e. within `[00:00, 00:00 of the next day)` UTC.
    ///
    /// Zoned date-times are converted to UTC before the day is taken.
    pub async fn find_by_day(&self, day: impl IntoUtcDay) -> StoreResult<LazyCollection<'a, B, R>> {
        let start = day
            .into_utc_day()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let end = start + TimeDelta::days(1);
        let field = R::timestamp_attribute();

        self.find_where(
            Filter::gte(field, start).and(Filter::lt(field, end)),
            FindOptions::default(),
        )
        .await
    }

    async fn query(&self, filter: Option<Expr>, options: FindOptions) -> StoreResult<LazyCollection<'a, B, R>> {
        self.ensure_indices().await?;

        let mut query = Query::builder().options(options);

        if let Some(filter) = filter {
            query = query.filter(filter);
        }

        Ok(LazyCollection::from_query(&self.store.backend, query.build()))
    }
}

/// A value naming a calendar day in UTC.
pub trait IntoUtcDay {
    fn into_utc_day(self) -> NaiveDate;
}

impl IntoUtcDay for NaiveDate {
    fn into_utc_day(self) -> NaiveDate {
        self
    }
}

/// Zone-less date-times are read as UTC.
impl IntoUtcDay for NaiveDateTime {
    fn into_utc_day(self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> IntoUtcDay for DateTime<Tz> {
    fn into_utc_day(self) -> NaiveDate {
        self.with_timezone(&Utc).date_naive()
    }
}
