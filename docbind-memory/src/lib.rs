//! In-memory document storage backend for docbind.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development
//! and testing.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Generated identifiers** - Every inserted document receives a fresh object id
//! - **Full query support** - Filtering, sorting, `skip` and `limit`, paginated counts
//!
//! # Quick Start
//!
//! ```ignore
//! use docbind::{prelude::*, memory::InMemoryStore};
//!
//! #[derive(Debug, Clone, PartialEq, Resource)]
//! #[attribute(name, index)]
//! pub struct User {
//!     entity: Entity,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ResourceStore::new(InMemoryStore::builder().build().await?);
//!     let users = store.resources::<User>();
//!
//!     users.create(fields! { "name" => "Alice" }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbind_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
