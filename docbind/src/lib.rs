//! Main docbind crate: declarative resources over JSON document stores.
//!
//! This crate is the primary entry point for users of the docbind framework. It re-exports
//! the core types, the `#[derive(Resource)]` macro and the storage backends.
//!
//! # Features
//!
//! - **Declarative resources** - Attributes, indices and finders from `#[attribute(...)]`
//! - **Lazy collections** - Query results fetched once on demand, countable with or
//!   without pagination, mergeable
//! - **Normalized storage** - Keys are sanitized and dates and decimals coerced before
//!   anything reaches the backend
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docbind::{prelude::*, memory::InMemoryStore};
//!
//! #[derive(Debug, Clone, PartialEq, Resource)]
//! #[attribute(first, index)]
//! #[attribute(second, index, order = "descending")]
//! #[attribute(third, finder = "find_by_third_attribute")]
//! pub struct Account {
//!     entity: Entity,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ResourceStore::new(InMemoryStore::builder().build().await?);
//!     let accounts = store.resources::<Account>();
//!
//!     let account = accounts
//!         .create(fields! { "first" => "first", "second" => "second", "third" => "third" })
//!         .await?;
//!
//!     let mut found = Account::find_by_third_attribute(&accounts, "third").await?;
//!     assert_eq!(found.first().await?.and_then(Account::id), account.id());
//!
//!     let mut page = accounts.all(FindOptions::new().skip(0).limit(10)).await?;
//!     println!("{}", page.to_json().await?);
//!
//!     store.shutdown().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docbind;

pub mod prelude;

pub use docbind_core::{attribute, backend, collection, error, fields, index, normalize, query, resource, store, value};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docbind_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docbind_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
