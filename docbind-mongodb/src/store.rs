use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, CountOptions, FindOptions},
};
use tracing::debug;

use docbind_core::{
    attribute::IndexOrder,
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    index::IndexKey,
    query::{Query, SortDirection},
    resource::ID_FIELD,
};

use crate::query::MongoQueryTranslator;

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

fn backend_error(error: mongodb::error::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn index_keys(keys: &[IndexKey]) -> Document {
    keys.iter()
        .map(|key| {
            let order = match key.order {
                IndexOrder::Ascending => 1,
                IndexOrder::Descending => -1,
            };

            (key.field.clone(), Bson::Int32(order))
        })
        .collect()
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, document: Document, collection: &str) -> StoreResult<ObjectId> {
        let result = self
            .get_collection(collection)
            .insert_one(document)
            .await
            .map_err(backend_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::InvalidDocument("inserted document has no object id".into()))?;

        debug!(collection, %id, "inserted document");

        Ok(id)
    }

    async fn update_document(&self, id: ObjectId, document: Document, collection: &str) -> StoreResult<()> {
        let result = self
            .get_collection(collection)
            .replace_one(doc! { ID_FIELD: id }, document)
            .await
            .map_err(backend_error)?;

        if result.matched_count == 0 {
            return Err(StoreError::DocumentNotFound(id.to_hex(), collection.to_string()));
        }

        Ok(())
    }

    async fn find_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.skip {
            options.skip = Some(skip as u64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        let filter = MongoQueryTranslator::translate(query.filter.as_ref())?;
        debug!(collection, %filter, "finding documents");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)
    }

    async fn count_documents(&self, query: Query, collection: &str) -> StoreResult<u64> {
        let mut options = CountOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as u64);
        }
        if let Some(skip) = query.skip {
            options.skip = Some(skip as u64);
        }

        self.get_collection(collection)
            .count_documents(MongoQueryTranslator::translate(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(backend_error)
    }

    async fn ensure_index(&self, keys: Vec<IndexKey>, collection: &str) -> StoreResult<()> {
        let keys = index_keys(&keys);
        debug!(collection, %keys, "creating index");

        self.get_collection(collection)
            .create_index(IndexModel::builder().keys(keys).build())
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.get_collection(collection)
            .drop()
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_index_keys_keep_declaration_order() {
        let keys = index_keys(&[
            IndexKey::new("first", IndexOrder::Ascending),
            IndexKey::new("second", IndexOrder::Descending),
        ]);

        assert_eq!(keys, doc! { "first": 1, "second": -1 });
        assert_eq!(keys.keys().collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
