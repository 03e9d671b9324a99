//! The resource type catalogue.

use super::graph::{build_field_graph, GraphedField};
use super::resource::ResourceType;
use crate::error::{Error, ErrorKind};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// The frozen innards of a registry.
///
/// Registered types hold a [`Weak`] reference back to this, which is how an owned
/// [`ResourceType`] can resolve graphed lookups without the registry and its types owning each
/// other.
#[derive(Debug)]
pub(crate) struct Inner {
    types: BTreeMap<String, ResourceType>,
    graphs: BTreeMap<String, BTreeMap<String, GraphedField>>,
}

/// An immutable catalogue of resource types and their precomputed field graphs.
///
/// A registry is built exactly once, normally at process startup, and is read-only afterward.
/// Cloning is cheap (a shared handle); hand clones to whatever needs to resolve types rather
/// than reaching for global state.
#[derive(Clone, Debug)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Look up a registered type by name.
    pub fn fetch_type(&self, name: &str) -> Result<&ResourceType, Error> {
        self.inner
            .types
            .get(name)
            .ok_or_else(|| Error::new(ErrorKind::ResourceTypeNotRegistered).with("key", name))
    }

    /// Look up a registered type known to exist.
    ///
    /// # Panics
    ///
    /// Panics if no type with this name is registered.
    pub fn expect_type(&self, name: &str) -> &ResourceType {
        self.fetch_type(name)
            .unwrap_or_else(|error| panic!("resource type {name:?}: {error}"))
    }

    /// Is a type with this name registered?
    pub fn contains(&self, name: &str) -> bool {
        self.inner.types.contains_key(name)
    }

    /// The registered types, in name order.
    pub fn types(&self) -> impl Iterator<Item = &ResourceType> {
        self.inner.types.values()
    }

    /// The precomputed field graph for a registered type.
    pub(crate) fn field_graph(&self, name: &str) -> Option<&BTreeMap<String, GraphedField>> {
        self.inner.graphs.get(name)
    }
}

/// Builds a [`Registry`] from a fixed set of type declarations.
///
/// Misconfiguration — a duplicate type name, or a relationship naming a type that was never
/// registered — is a bug in the hosting application, so both fail fast with a panic at build
/// time rather than surfacing as request-time errors.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: BTreeMap<String, ResourceType>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type.
    ///
    /// # Panics
    ///
    /// Panics if a type with the same name was already registered.
    pub fn register(mut self, resource_type: ResourceType) -> Self {
        let name = resource_type.name().to_owned();
        let previous = self.types.insert(name.clone(), resource_type);
        assert!(
            previous.is_none(),
            "resource type {name:?} is already registered"
        );
        self
    }

    /// Build every type's field graph and freeze the catalogue.
    ///
    /// # Panics
    ///
    /// Panics if any graphable relationship references an unregistered type.
    pub fn build(self) -> Registry {
        let graphs: BTreeMap<_, _> = self
            .types
            .keys()
            .map(|name| {
                tracing::debug!("building field graph for {name}");
                (name.clone(), build_field_graph(&self.types, name))
            })
            .collect();
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let mut types = self.types;
            for resource_type in types.values_mut() {
                resource_type.attach_registry(weak.clone());
            }
            Inner { types, graphs }
        });
        Registry { inner }
    }
}
