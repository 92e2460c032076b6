//! Error types and result types for resource store operations.
//!
//! Use [`StoreResult<T>`] as the return type for fallible operations. Absence is never an
//! error in this crate: point lookups return `Ok(None)` and empty queries return empty
//! collections, so the variants below only describe genuine failures.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when mapping resources onto a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An update targeted a document that is not stored.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The document has an invalid structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// No attribute of the resource type declares the requested finder.
    /// The first argument is the finder name, the second is the collection name.
    #[error("Unknown finder {0} for collection {1}")]
    UnknownFinder(String, String),
    /// The resource type declares no attribute with the given name.
    #[error("Unknown attribute {0} for collection {1}")]
    UnknownAttribute(String, String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for resource store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
