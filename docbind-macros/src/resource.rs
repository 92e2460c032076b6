use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Member, Result};

pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    expand(&input).unwrap_or_else(Error::into_compile_error)
}

///
/// Container
///

struct Container {
    collection: String,
    timestamp: String,
}

impl Container {
    fn parse(input: &DeriveInput) -> Result<Self> {
        let mut collection = None;
        let mut timestamp = None;

        for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("resource")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    collection = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else if meta.path.is_ident("timestamp") {
                    timestamp = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `collection` or `timestamp`"))
                }
            })?;
        }

        Ok(Self {
            collection: collection
                .unwrap_or_else(|| format!("{}s", input.ident.to_string().to_lowercase())),
            timestamp: timestamp.unwrap_or_else(|| "at".to_string()),
        })
    }
}

///
/// Declaration
///

enum Order {
    Ascending,
    Descending,
}

struct Declaration {
    name: Ident,
    index: bool,
    order: Option<Order>,
    finder: Option<Ident>,
}

impl Declaration {
    fn parse(attr: &Attribute) -> Result<Self> {
        let mut name = None;
        let mut index = false;
        let mut order = None;
        let mut finder = None;

        attr.parse_nested_meta(|meta| {
            if name.is_none() {
                name = Some(meta.path.require_ident()?.clone());
                return Ok(());
            }

            if meta.path.is_ident("index") {
                index = true;
            } else if meta.path.is_ident("order") {
                let value = meta.value()?.parse::<LitStr>()?;

                order = Some(match value.value().as_str() {
                    "ascending" | "asc" => Order::Ascending,
                    "descending" | "desc" => Order::Descending,
                    _ => return Err(Error::new_spanned(&value, "expected `ascending` or `descending`")),
                });
            } else if meta.path.is_ident("finder") {
                let value = meta.value()?.parse::<LitStr>()?;
                finder = Some(value.parse::<Ident>()?);
            } else {
                return Err(meta.error("expected `index`, `order` or `finder`"));
            }

            Ok(())
        })?;

        let name = name.ok_or_else(|| Error::new_spanned(attr, "missing attribute name"))?;

        Ok(Self { name, index, order, finder })
    }

    fn key(&self) -> String {
        self.name.to_string()
    }

    fn finder_ident(&self) -> Ident {
        self.finder
            .clone()
            .unwrap_or_else(|| format_ident!("find_by_{}", self.name))
    }

    fn options(&self) -> TokenStream {
        let mut options = quote! { ::docbind::attribute::AttributeOptions::new() };

        if self.index {
            options = quote! { #options.indexed() };
        }

        match self.order {
            Some(Order::Ascending) => {
                options = quote! { #options.order(::docbind::attribute::IndexOrder::Ascending) };
            }
            Some(Order::Descending) => {
                options = quote! { #options.order(::docbind::attribute::IndexOrder::Descending) };
            }
            None => {}
        }

        if let Some(finder) = &self.finder {
            let finder = finder.to_string();
            options = quote! { #options.finder(#finder) };
        }

        options
    }
}

fn entity_member(input: &DeriveInput) -> Result<Member> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "Resource can only be derived for structs wrapping an Entity",
        ));
    };

    let mut fields = match &data.fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
    };

    if fields.len() != 1 {
        return Err(Error::new_spanned(
            &data.fields,
            "Resource can only be derived for structs with a single Entity field",
        ));
    }

    Ok(match fields.pop().and_then(|field| field.ident.clone()) {
        Some(ident) => Member::Named(ident),
        None => Member::Unnamed(0.into()),
    })
}

fn expand(input: &DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Resource cannot be derived for generic types",
        ));
    }

    let ident = &input.ident;
    let member = entity_member(input)?;
    let Container { collection, timestamp } = Container::parse(input)?;

    let declarations = input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("attribute"))
        .map(Declaration::parse)
        .collect::<Result<Vec<_>>>()?;

    // Every declaration reaches the registry; methods come from the last one per name.
    let registrations = declarations.iter().map(|declaration| {
        let key = declaration.key();
        let options = declaration.options();

        quote! {
            registry.declare(#key, #options);
        }
    });

    let mut effective: Vec<&Declaration> = Vec::new();

    for declaration in &declarations {
        effective.retain(|existing| existing.name != declaration.name);
        effective.push(declaration);
    }

    let methods = effective.iter().map(|declaration| {
        let key = declaration.key();
        let getter = &declaration.name;
        let setter = format_ident!("set_{}", declaration.name);
        let finder = declaration.finder_ident();
        let getter_doc = format!("Returns the `{key}` attribute.");
        let finder_doc = format!("Finds the resources whose `{key}` attribute equals `value`.");

        quote! {
            #[doc = #getter_doc]
            pub fn #getter(&self) -> ::std::option::Option<&::docbind::value::Value> {
                self.#member.get(#key)
            }

            pub fn #setter(&mut self, value: impl ::std::convert::Into<::docbind::value::Value>) {
                self.#member.set(#key, value);
            }

            #[doc = #finder_doc]
            pub async fn #finder<'a, B: ::docbind::backend::StoreBackend>(
                resources: &::docbind::store::Resources<'a, B, Self>,
                value: impl ::std::convert::Into<::docbind::value::Value>,
            ) -> ::docbind::error::StoreResult<::docbind::collection::LazyCollection<'a, B, Self>> {
                resources.find_by(#key, value).await
            }
        }
    });

    Ok(quote! {
        impl ::docbind::resource::Resource for #ident {
            fn collection_name() -> &'static str {
                #collection
            }

            fn registry() -> &'static ::docbind::attribute::AttributeRegistry {
                static REGISTRY: ::std::sync::LazyLock<::docbind::attribute::AttributeRegistry> =
                    ::std::sync::LazyLock::new(|| {
                        #[allow(unused_mut)]
                        let mut registry = ::docbind::attribute::AttributeRegistry::new();
                        #(#registrations)*
                        registry
                    });

                &REGISTRY
            }

            fn timestamp_attribute() -> &'static str {
                #timestamp
            }

            fn from_entity(entity: ::docbind::resource::Entity) -> Self {
                Self { #member: entity }
            }

            fn entity(&self) -> &::docbind::resource::Entity {
                &self.#member
            }

            fn entity_mut(&mut self) -> &mut ::docbind::resource::Entity {
                &mut self.#member
            }
        }

        impl #ident {
            #(#methods)*
        }
    })
}
