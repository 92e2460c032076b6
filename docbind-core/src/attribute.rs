//! Declarative attribute metadata for resource types.
//!
//! Every resource type owns one [`AttributeRegistry`], built once when the type is first
//! used and read-only afterwards. The registry records, in declaration order, which
//! attributes exist, which of them are indexed (and in which order), and under which name
//! each attribute's finder is exposed.
//!
//! The `#[derive(Resource)]` macro builds the registry from `#[attribute(...)]` declarations
//! and generates the accessors and finders next to it.

use indexmap::IndexMap;
use tracing::warn;

use crate::index::IndexKey;

/// Sort order of an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexOrder {
    #[default]
    Ascending,
    Descending,
}

/// Options accepted when declaring an attribute.
///
/// # Example
///
/// ```ignore
/// let options = AttributeOptions::new()
///     .indexed()
///     .order(IndexOrder::Descending)
///     .finder("find_by_third_attribute");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    indexed: bool,
    index_order: IndexOrder,
    finder_name: Option<String>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the attribute as indexed.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Sets the index order. Has no effect unless the attribute is indexed.
    pub fn order(mut self, order: IndexOrder) -> Self {
        self.index_order = order;
        self
    }

    /// Overrides the derived `find_by_<name>` finder name.
    pub fn finder(mut self, name: impl Into<String>) -> Self {
        self.finder_name = Some(name.into());
        self
    }
}

/// Metadata of a single declared attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    name: String,
    indexed: bool,
    index_order: IndexOrder,
    finder_name: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, options: AttributeOptions) -> Self {
        Self {
            name: name.into(),
            indexed: options.indexed,
            index_order: options.index_order,
            finder_name: options.finder_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn index_order(&self) -> IndexOrder {
        self.index_order
    }

    /// Returns the finder name, deriving `find_by_<name>` when none was declared.
    pub fn finder_name(&self) -> String {
        self.finder_name
            .clone()
            .unwrap_or_else(|| format!("find_by_{}", self.name))
    }
}

/// Ordered, name-keyed set of attribute descriptors for one resource type.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    attributes: IndexMap<String, AttributeDescriptor>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute.
    ///
    /// Declaring a name twice replaces the earlier descriptor in place; the attribute keeps
    /// its original position.
    pub fn declare(&mut self, name: impl Into<String>, options: AttributeOptions) -> &mut Self {
        let descriptor = AttributeDescriptor::new(name, options);

        if let Some(previous) = self
            .attributes
            .insert(descriptor.name.clone(), descriptor)
        {
            warn!(attribute = %previous.name, "attribute declared more than once, keeping the last declaration");
        }

        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterates over the descriptors in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.values()
    }

    /// Names of the indexed attributes, in declaration order.
    pub fn indices(&self) -> Vec<&str> {
        self.attributes()
            .filter(|descriptor| descriptor.indexed)
            .map(AttributeDescriptor::name)
            .collect()
    }

    /// Index keys for every indexed attribute, in declaration order.
    pub fn index_keys(&self) -> Vec<IndexKey> {
        self.attributes()
            .filter(|descriptor| descriptor.indexed)
            .map(|descriptor| IndexKey::new(descriptor.name.clone(), descriptor.index_order))
            .collect()
    }

    pub fn finder_name_for(&self, name: &str) -> Option<String> {
        self.get(name).map(AttributeDescriptor::finder_name)
    }

    /// Looks up the attribute whose finder is called `finder`.
    pub fn attribute_for_finder(&self, finder: &str) -> Option<&AttributeDescriptor> {
        self.attributes()
            .find(|descriptor| descriptor.finder_name() == finder)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
