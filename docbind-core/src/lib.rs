//! Declarative resource mapping over JSON document stores.
//!
//! This crate is the core of the docbind project and provides:
//!
//! - **Value model** ([`value`]) - Field values and ordered field mappings
//! - **Normalization** ([`normalize`]) - Key sanitization and value coercion for storage
//! - **Attributes** ([`attribute`]) - Per-type attribute, index and finder declarations
//! - **Index management** ([`index`]) - Index creation performed at most once per type
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Query and filtering API** ([`query`]) - Filter expressions and pagination
//! - **Resources** ([`resource`]) - Mapped entities and the [`Resource`](resource::Resource) trait
//! - **Resource store** ([`store`]) - Class-level operations: create, save, get, find
//! - **Lazy collections** ([`collection`]) - Deferred, cached, mergeable query results
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docbind::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Resource)]
//! #[attribute(first, index)]
//! #[attribute(second)]
//! pub struct Account {
//!     entity: Entity,
//! }
//!
//! let store = ResourceStore::new(InMemoryStore::new());
//! let accounts = store.resources::<Account>();
//!
//! accounts.create(fields! { "first" => "first", "second" => "second" }).await?;
//! let mut found = Account::find_by_first(&accounts, "first").await?;
//! assert_eq!(found.size().await?, 1);
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbind_core;

pub mod attribute;
pub mod backend;
pub mod collection;
pub mod error;
pub mod index;
pub mod normalize;
pub mod query;
pub mod resource;
pub mod store;
pub mod value;

#[cfg(test)]
mod testing;
