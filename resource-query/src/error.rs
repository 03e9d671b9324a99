//! Structured, contextual errors.
//!
//! Every fallible operation in this crate reports failure through one uniform shape: an
//! [`ErrorKind`] tag plus a context map of named values (`key`, `attribute`, `source`, `input`,
//! `resource_type`, `max_allowed`, and friends). Validation failures originate from untrusted
//! client input, so they are always returned as values, never raised; panics are reserved for
//! programmer errors such as the `expect_*` lookup variants and registry misconfiguration.
//!
//! The `source` context entry is a path (a [`Value::List`] of keys and indices) locating the
//! failing piece of input inside a larger request, built outside-in with
//! [`Error::prepend_source`]. The [`collect`] submodule provides the tree walker that applies
//! those tags while gathering every error out of a composite validation.

pub mod collect;

use crate::value::Value;
use derive_more::Display;
use snafu::Snafu;
use std::collections::BTreeMap;

/// The closed set of error tags reported by this crate.
///
/// The display form of each tag is its snake_case name, which is also the stable identifier a
/// caller should match on when serializing errors for clients.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    #[display(fmt = "attribute_not_found")]
    AttributeNotFound,
    #[display(fmt = "cannot_filter_by_attribute")]
    CannotFilterByAttribute,
    #[display(fmt = "cannot_include_relationship")]
    CannotIncludeRelationship,
    #[display(fmt = "cannot_sort_by_attribute")]
    CannotSortByAttribute,
    #[display(fmt = "field_not_found")]
    FieldNotFound,
    #[display(fmt = "invalid_field")]
    InvalidField,
    #[display(fmt = "invalid_field_type")]
    InvalidFieldType,
    #[display(fmt = "invalid_filter")]
    InvalidFilter,
    #[display(fmt = "invalid_filter_operator")]
    InvalidFilterOperator,
    #[display(fmt = "invalid_sorter")]
    InvalidSorter,
    #[display(fmt = "max_depth_exceeded")]
    MaxDepthExceeded,
    #[display(fmt = "max_filters_exceeded")]
    MaxFiltersExceeded,
    #[display(fmt = "max_page_size_exceeded")]
    MaxPageSizeExceeded,
    #[display(fmt = "max_sorters_exceeded")]
    MaxSortersExceeded,
    #[display(fmt = "no_type_registry")]
    NoTypeRegistry,
    #[display(fmt = "relationship_not_found")]
    RelationshipNotFound,
    #[display(fmt = "resource_type_not_registered")]
    ResourceTypeNotRegistered,
    #[display(fmt = "type_cast_failure")]
    TypeCastFailure,
}

/// The context map attached to an [`Error`].
pub type Context = BTreeMap<&'static str, Value>;

/// A tagged, contextual error.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(display("{}{}", kind, format_context(context)))]
pub struct Error {
    kind: ErrorKind,
    context: Context,
}

impl Error {
    /// An error with the given tag and no context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Context::new(),
        }
    }

    /// Attach a context entry, replacing any previous entry under the same key.
    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.context.insert(key, value.into());
        self
    }

    /// The error tag.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The full context map.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Look up a single context entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// The `source` path locating this error within a larger request, outermost segment first.
    pub fn source_path(&self) -> &[Value] {
        match self.context.get("source") {
            Some(Value::List(path)) => path,
            _ => &[],
        }
    }

    /// Push a path segment onto the front of this error's `source` path.
    ///
    /// Composite validators call this while unwinding, so the finished path reads outside-in:
    /// the section first, then the key or index within it.
    pub fn prepend_source(mut self, segment: impl Into<Value>) -> Self {
        let tail = match self.context.remove("source") {
            Some(Value::List(path)) => path,
            Some(other) => vec![other],
            None => vec![],
        };
        let mut path = vec![segment.into()];
        path.extend(tail);
        self.context.insert("source", Value::List(path));
        self
    }
}

fn format_context(context: &Context) -> String {
    if context.is_empty() {
        return String::new();
    }
    let entries = context
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" ({entries})")
}
