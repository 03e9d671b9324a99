//! The resource type aggregate.

use super::field::{Field, ResolvedField};
use super::graph::GraphedField;
use super::registry::{self, Registry};
use crate::error::{Context, Error, ErrorKind};
use crate::query::{Filter, FilterInput, Sorter, SorterInput};
use crate::value::{self, Record, Value};
use std::collections::BTreeMap;
use std::sync::Weak;

/// A named, queryable entity shape exposed to clients.
///
/// A resource type is assembled once with the chainable `with_*`/`put_field` builders, then
/// registered; the [`Registry`] owns the canonical instance and precomputes its field graph.
/// After registration the type transparently resolves dotted nested field names through that
/// graph, so `validate_filter` on a `songs` type accepts `"album.artist.name"` as readily as
/// `"title"`.
#[derive(Clone, Debug)]
pub struct ResourceType {
    name: String,
    fields: BTreeMap<String, Field>,
    id: Option<String>,
    max_filters: Option<u64>,
    max_sorters: Option<u64>,
    max_depth: u32,
    meta: BTreeMap<String, Value>,
    registry: Option<Weak<registry::Inner>>,
}

impl ResourceType {
    /// A new, empty resource type.
    ///
    /// The maximum graph depth defaults to 1 and the filter/sorter counts to unlimited.
    ///
    /// # Panics
    ///
    /// Panics if `name` contains a `.`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(
            !name.contains('.'),
            "resource type name {name:?} must not contain '.'"
        );
        Self {
            name,
            fields: BTreeMap::new(),
            id: None,
            max_filters: None,
            max_sorters: None,
            max_depth: 1,
            meta: BTreeMap::new(),
            registry: None,
        }
    }

    /// Add or replace a field, keyed by its name.
    ///
    /// An attribute named `id` becomes the id field automatically unless one is already set.
    pub fn put_field(mut self, field: impl Into<Field>) -> Self {
        let field = field.into();
        if self.id.is_none() && field.name() == "id" && field.as_attribute().is_some() {
            self.id = Some("id".into());
        }
        self.fields.insert(field.name().to_owned(), field);
        self
    }

    /// Name the id field explicitly.
    pub fn with_id(mut self, name: impl Into<String>) -> Self {
        self.id = Some(name.into());
        self
    }

    /// Bound the number of filters one request may attempt. [`None`] means unlimited.
    pub fn with_max_filters(mut self, max: impl Into<Option<u64>>) -> Self {
        self.max_filters = max.into();
        self
    }

    /// Bound the number of sorters one request may attempt. [`None`] means unlimited.
    pub fn with_max_sorters(mut self, max: impl Into<Option<u64>>) -> Self {
        self.max_sorters = max.into();
        self
    }

    /// Bound relationship traversal when this type's field graph is built.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Attach a free-form metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields, in name order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// The name of the id field, if any.
    pub fn id_field(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn max_filters(&self) -> Option<u64> {
        self.max_filters
    }

    pub fn max_sorters(&self) -> Option<u64> {
        self.max_sorters
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// The free-form metadata map.
    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    /// The registry this type is registered with, if it is registered and still alive.
    pub fn registry(&self) -> Option<Registry> {
        self.registry.as_ref().and_then(Registry::from_weak)
    }

    /// The names of the types this type's relationships point at.
    pub fn related_type_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .values()
            .filter_map(|field| field.as_relationship())
            .map(|relationship| relationship.related_type())
    }

    pub(crate) fn attach_registry(&mut self, registry: Weak<registry::Inner>) {
        self.registry = Some(registry);
    }

    fn not_found(&self, kind: ErrorKind, key: &str) -> Error {
        Error::new(kind)
            .with("key", key)
            .with("resource_type", self.name.as_str())
    }

    /// Look a field up in this type's own field map, ignoring the registry.
    pub fn fetch_local_field(&self, name: &str) -> Result<&Field, Error> {
        self.fields
            .get(name)
            .ok_or_else(|| self.not_found(ErrorKind::FieldNotFound, name))
    }

    /// Look a field up through this type's field graph.
    ///
    /// Requires registration (`no_type_registry` otherwise). A miss on a name nested deeper
    /// than `max_depth` reports `max_depth_exceeded`; any other miss is `field_not_found`.
    pub fn fetch_graphed_field(&self, name: &str) -> Result<GraphedField, Error> {
        let registry = self.registry().ok_or_else(|| {
            Error::new(ErrorKind::NoTypeRegistry).with("resource_type", self.name.as_str())
        })?;
        let graph = registry
            .field_graph(&self.name)
            .expect("registered type always has a field graph");
        match graph.get(name) {
            Some(graphed) => Ok(graphed.clone()),
            None => {
                let depth = name.matches('.').count() as u32;
                if depth > self.max_depth {
                    Err(self
                        .not_found(ErrorKind::MaxDepthExceeded, name)
                        .with("max_allowed", self.max_depth as i64))
                } else {
                    Err(self.not_found(ErrorKind::FieldNotFound, name))
                }
            }
        }
    }

    /// Look a field up by name.
    ///
    /// Registered types resolve through their field graph, so dotted nested names work
    /// transparently; unregistered types fall back to local lookup.
    pub fn fetch_field(&self, name: &str) -> Result<ResolvedField, Error> {
        match self.registry() {
            Some(_) => self.fetch_graphed_field(name).map(ResolvedField::Graphed),
            None => self
                .fetch_local_field(name)
                .map(|field| ResolvedField::Local(field.clone())),
        }
    }

    /// Like [`fetch_field`](Self::fetch_field), requiring the result to be an attribute.
    ///
    /// Absence and kind mismatch both surface as `attribute_not_found`.
    pub fn fetch_attribute(&self, name: &str) -> Result<ResolvedField, Error> {
        match self.fetch_field(name) {
            Ok(resolved) if resolved.attribute().is_some() => Ok(resolved),
            Ok(_) => Err(self.not_found(ErrorKind::AttributeNotFound, name)),
            Err(error) if error.kind() == ErrorKind::FieldNotFound => {
                Err(self.not_found(ErrorKind::AttributeNotFound, name))
            }
            Err(error) => Err(error),
        }
    }

    /// Like [`fetch_field`](Self::fetch_field), requiring the result to be a relationship.
    ///
    /// Absence and kind mismatch both surface as `relationship_not_found`.
    pub fn fetch_relationship(&self, name: &str) -> Result<ResolvedField, Error> {
        match self.fetch_field(name) {
            Ok(resolved) if resolved.relationship().is_some() => Ok(resolved),
            Ok(_) => Err(self.not_found(ErrorKind::RelationshipNotFound, name)),
            Err(error) if error.kind() == ErrorKind::FieldNotFound => {
                Err(self.not_found(ErrorKind::RelationshipNotFound, name))
            }
            Err(error) => Err(error),
        }
    }

    /// Look a field up by name, for call sites that have already checked it exists.
    ///
    /// # Panics
    ///
    /// Panics if the lookup fails; a failure here is a bug in the hosting application.
    pub fn expect_field(&self, name: &str) -> ResolvedField {
        self.fetch_field(name)
            .unwrap_or_else(|error| panic!("field {name:?} on type {:?}: {error}", self.name))
    }

    /// Like [`expect_field`](Self::expect_field) for attributes.
    ///
    /// # Panics
    ///
    /// Panics if the lookup fails or the field is not an attribute.
    pub fn expect_attribute(&self, name: &str) -> ResolvedField {
        self.fetch_attribute(name)
            .unwrap_or_else(|error| panic!("attribute {name:?} on type {:?}: {error}", self.name))
    }

    /// Like [`expect_field`](Self::expect_field) for relationships.
    ///
    /// # Panics
    ///
    /// Panics if the lookup fails or the field is not a relationship.
    pub fn expect_relationship(&self, name: &str) -> ResolvedField {
        self.fetch_relationship(name)
            .unwrap_or_else(|error| {
                panic!("relationship {name:?} on type {:?}: {error}", self.name)
            })
    }

    /// Validate one filter against this type.
    ///
    /// The pipeline is: parse the raw input, resolve the named field as an attribute, then let
    /// the attribute check permissions, cast the value, and check operator compatibility. The
    /// first failing stage's error is returned.
    pub fn validate_filter(&self, input: impl Into<FilterInput>) -> Result<Filter, Error> {
        let (field_name, operator, value) = input.into().parse()?;
        let resolved = self.fetch_attribute(&field_name)?;
        let attribute = resolved
            .attribute()
            .expect("fetch_attribute only returns attributes");
        let (operator, value) = attribute.validate_filter(operator, &value)?;
        Ok(Filter::new(resolved, operator, value))
    }

    /// Validate one sort key against this type.
    pub fn validate_sorter(&self, input: impl Into<SorterInput>) -> Result<Sorter, Error> {
        let (direction, field_name) = input.into().parse()?;
        let resolved = self.fetch_attribute(&field_name)?;
        let attribute = resolved
            .attribute()
            .expect("fetch_attribute only returns attributes");
        let direction = attribute.validate_sorter(direction)?;
        Ok(Sorter::new(direction, resolved))
    }

    /// Enforce `max_filters` over a list of filter attempts.
    ///
    /// When the attempt count exceeds the limit, one `max_filters_exceeded` error is prepended
    /// to the otherwise unchanged list. The count deliberately includes attempts that already
    /// failed validation: the limit bounds how much work a request may ask for, not how much of
    /// it was well-formed.
    pub fn validate_max_filters<T>(
        &self,
        results: Vec<Result<T, Error>>,
        context: Context,
    ) -> Vec<Result<T, Error>> {
        validate_max(
            results,
            self.max_filters,
            ErrorKind::MaxFiltersExceeded,
            context,
        )
    }

    /// Enforce `max_sorters` over a list of sorter attempts; see
    /// [`validate_max_filters`](Self::validate_max_filters).
    pub fn validate_max_sorters<T>(
        &self,
        results: Vec<Result<T, Error>>,
        context: Context,
    ) -> Vec<Result<T, Error>> {
        validate_max(
            results,
            self.max_sorters,
            ErrorKind::MaxSortersExceeded,
            context,
        )
    }

    /// Read the value a field maps to out of a record.
    ///
    /// Graphed fields read through their whole `map_to` path; [`None`] means some hop along the
    /// path was absent. An unknown field name is an error, keeping "no such field" distinct
    /// from "no value here".
    pub fn map_value(&self, record: &Record, name: &str) -> Result<Option<Value>, Error> {
        let resolved = self.fetch_field(name)?;
        Ok(value::dig(record, resolved.map_to_path()).cloned())
    }

    /// Read several field values, preserving the caller's field order.
    ///
    /// Order matters for round-tripping client-specified field lists, which is why this returns
    /// pairs rather than a map.
    pub fn map_values<I>(&self, record: &Record, names: I) -> Result<Vec<(String, Option<Value>)>, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.map_value(record, name)
                    .map(|value| (name.to_owned(), value))
            })
            .collect()
    }

    /// [`map_values`](Self::map_values) collapsed into a map, for when order is irrelevant.
    pub fn to_map<I>(&self, record: &Record, names: I) -> Result<BTreeMap<String, Option<Value>>, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Ok(self.map_values(record, names)?.into_iter().collect())
    }
}

fn validate_max<T>(
    mut results: Vec<Result<T, Error>>,
    max: Option<u64>,
    kind: ErrorKind,
    context: Context,
) -> Vec<Result<T, Error>> {
    if let Some(max) = max {
        if results.len() as u64 > max {
            let mut error = Error::new(kind).with("max_allowed", max as i64);
            for (key, value) in context {
                error = error.with(key, value);
            }
            results.insert(0, Err(error));
        }
    }
    results
}
