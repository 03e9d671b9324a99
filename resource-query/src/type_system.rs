//! The resource type system: types, fields, and the precomputed field graph.
//!
//! A backend service describes each entity it exposes as a [`ResourceType`]: a named aggregate
//! of [`Attribute`]s (scalar fields that own their casting and per-field query permissions) and
//! [`Relationship`]s (links to other types). Types are assembled once with chainable builder
//! methods, gathered into a [`Registry`], and frozen; from then on everything is read-only and
//! safe to share across request-handling threads without synchronization.
//!
//! Registration is what makes nested field names work. For each type, the registry walks its
//! relationships breadth-first up to the type's `max_depth` and flattens every reachable field
//! into a map from dotted qualified name (`"album.artist.name"`) to a [`GraphedField`] carrying
//! the chain of internal keys needed to read the value out of nested data. Lookups at request
//! time are then a single map access, never a recursive traversal.
//!
//! Field lookups come in two flavors at every seam: `fetch_*` methods return `Result` and are
//! for untrusted input, while `expect_*` methods panic and are for call sites that have already
//! validated their input. Which one a caller reaches for is a statement about whose bug a
//! failure would be.

pub mod attribute;
pub mod field;
pub mod graph;
pub mod registry;
pub mod relationship;
pub mod resource;

pub use attribute::Attribute;
pub use field::{Field, ResolvedField};
pub use graph::GraphedField;
pub use registry::{Registry, RegistryBuilder};
pub use relationship::{Cardinality, Relationship};
pub use resource::ResourceType;
