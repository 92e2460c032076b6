//! Resources and the entities backing them.
//!
//! An [`Entity`] is a single mapped document: an optional backend identifier, the field
//! mapping, and whether it has been persisted. A resource type wraps an entity and
//! implements [`Resource`], which ties it to a collection and an
//! [`AttributeRegistry`](crate::attribute::AttributeRegistry).
//!
//! Resource types are normally declared with `#[derive(Resource)]`:
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
//! ```

use bson::{Bson, Document, oid::ObjectId};
use std::fmt::Debug;
use tracing::warn;

use crate::{
    attribute::AttributeRegistry,
    error::{StoreError, StoreResult},
    normalize::{coerce, normalize, sanitize_key},
    value::{Fields, Value, document_to_fields, fields_to_document},
};

/// Name of the identifier field in stored documents.
pub const ID_FIELD: &str = "_id";

/// A single mapped document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    id: Option<ObjectId>,
    fields: Fields,
    persisted: bool,
}

impl Entity {
    /// Creates an unpersisted entity from normalized `fields`.
    ///
    /// Identifiers are assigned by the backend; an `_id` key in `fields` is dropped.
    pub fn new(fields: Fields) -> Self {
        let mut fields = normalize(fields);

        if fields.shift_remove(ID_FIELD).is_some() {
            warn!("ignoring caller supplied `{ID_FIELD}` field");
        }

        Self {
            id: None,
            fields,
            persisted: false,
        }
    }

    pub fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field, normalizing its key and value. The identifier cannot be set this way.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let key = sanitize_key(name);

        if key == ID_FIELD {
            warn!("ignoring attempt to set `{ID_FIELD}`");
            return;
        }

        self.fields.insert(key, coerce(value.into()));
    }

    /// Returns the fields plus `_id` when the entity has an identifier.
    pub fn to_hash(&self) -> Fields {
        let mut hash = self.fields.clone();

        if let Some(id) = self.id {
            hash.insert(ID_FIELD.to_string(), Value::Id(id));
        }

        hash
    }

    /// Builds the stored representation. The identifier is never part of it.
    pub fn to_document(&self) -> Document {
        fields_to_document(normalize(self.fields.clone()))
    }

    /// Maps a stored document back into a persisted entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] if the document has no object id.
    pub fn from_document(mut document: Document) -> StoreResult<Self> {
        let id = match document.remove(ID_FIELD) {
            Some(Bson::ObjectId(id)) => id,
            _ => return Err(StoreError::InvalidDocument("document has no object id".into())),
        };

        Ok(Self {
            id: Some(id),
            fields: document_to_fields(document),
            persisted: true,
        })
    }

    /// Records a successful write.
    pub(crate) fn mark_persisted(&mut self, id: ObjectId) {
        self.id.get_or_insert(id);
        self.persisted = true;
    }
}

/// A program-level type mapped to documents of one collection.
pub trait Resource: Debug + Clone + Send + Sync + 'static {
    /// Name of the collection holding this type's documents.
    fn collection_name() -> &'static str;

    /// Declared attributes of this type.
    fn registry() -> &'static AttributeRegistry;

    /// Attribute holding the timestamp `find_by_day` matches against.
    fn timestamp_attribute() -> &'static str {
        "at"
    }

    fn from_entity(entity: Entity) -> Self;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    /// Creates an unpersisted resource. Does not touch the backend.
    fn new(fields: Fields) -> Self {
        Self::from_entity(Entity::new(fields))
    }

    fn id(&self) -> Option<&ObjectId> {
        self.entity().id()
    }

    fn is_persisted(&self) -> bool {
        self.entity().is_persisted()
    }

    fn to_hash(&self) -> Fields {
        self.entity().to_hash()
    }
}

/// Conversion into a native document identifier.
///
/// Strings are parsed as hex object ids; malformed input yields `None`, which lookups
/// treat as "not found".
pub trait IntoResourceId {
    fn into_resource_id(self) -> Option<ObjectId>;
}

impl IntoResourceId for ObjectId {
    fn into_resource_id(self) -> Option<ObjectId> {
        Some(self)
    }
}

impl IntoResourceId for &ObjectId {
    fn into_resource_id(self) -> Option<ObjectId> {
        Some(*self)
    }
}

impl IntoResourceId for &str {
    fn into_resource_id(self) -> Option<ObjectId> {
        ObjectId::parse_str(self).ok()
    }
}

impl IntoResourceId for String {
    fn into_resource_id(self) -> Option<ObjectId> {
        self.as_str().into_resource_id()
    }
}

impl IntoResourceId for &String {
    fn into_resource_id(self) -> Option<ObjectId> {
        self.as_str().into_resource_id()
    }
}
