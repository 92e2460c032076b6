//! Procedural macros for the docbind project.
//!
//! This crate provides compile-time code generation for the docbind framework. Use the
//! macros through the `docbind` facade, which re-exports them next to the traits they
//! implement.

#[allow(unused_extern_crates)]
extern crate self as docbind_macros;

use proc_macro::TokenStream;

mod resource;

/// Derives `docbind::resource::Resource` for a struct wrapping a single `Entity`.
///
/// Container attributes:
/// * `#[resource(collection = "...")]` - collection name, defaults to the lowercase type
///   name followed by `s`
/// * `#[resource(timestamp = "...")]` - attribute matched by `find_by_day`, defaults to `at`
///
/// Each `#[attribute(name, ...)]` declares an attribute and generates the getter `name()`,
/// the setter `set_name(value)` and the finder `find_by_name(&resources, value)`:
/// * `index` - include the attribute in the type's compound index
/// * `order = "ascending" | "descending"` - index order
/// * `finder = "..."` - finder name replacing `find_by_<name>`
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Resource)]
/// #[resource(collection = "testresources")]
/// #[attribute(first, index)]
/// #[attribute(second, index, order = "descending")]
/// #[attribute(third, finder = "find_by_third_attribute")]
/// pub struct TestResource {
///     entity: Entity,
/// }
/// ```
#[proc_macro_derive(Resource, attributes(resource, attribute))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive_resource(input.into()).into()
}
