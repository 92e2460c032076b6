//! Convenient re-exports of commonly used types from docbind.
//!
//! ```ignore
//! use docbind::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Resource` trait and derive macro, entities and field values
//! - The resource store and lazy collections
//! - Store backends and builders
//! - Query construction and filtering
//! - Error types

pub use docbind_core::{
    attribute::{AttributeOptions, AttributeRegistry, IndexOrder},
    backend::{StoreBackend, StoreBackendBuilder},
    collection::LazyCollection,
    error::{StoreError, StoreResult},
    fields,
    query::{Expr, FieldOp, Filter, FindOptions, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    resource::{Entity, IntoResourceId, Resource},
    store::{IntoUtcDay, ResourceStore, Resources},
    value::{Fields, Value},
};
pub use docbind_macros::Resource;
