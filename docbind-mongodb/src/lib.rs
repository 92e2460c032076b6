//! MongoDB backend implementation for docbind.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! persisting resources as MongoDB documents and delegating filtering, sorting, pagination
//! and index creation to the server.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docbind = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The connection string and database name are provided through the builder.
//!
//! # Example
//!
//! ```ignore
//! use docbind::{backend::StoreBackendBuilder, mongodb::MongoDbStore, store::ResourceStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let store = ResourceStore::new(backend);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbind_mongodb;

pub mod query;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
