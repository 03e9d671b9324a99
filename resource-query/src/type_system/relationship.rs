//! Link fields between resource types.

use derive_more::Display;

/// How many related records a relationship points at.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    #[display(fmt = "one")]
    One,
    #[display(fmt = "many")]
    Many,
}

/// A link field to another resource type.
///
/// A relationship is graphable when the field graph may traverse it to reach nested fields.
/// Only to-one relationships can be graphable: traversing a to-many link for a nested filter or
/// sort would require a one-to-many join, which has no meaning under flat tabular query
/// semantics. Requesting `graphable` on a many-relationship is silently ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    name: String,
    map_to: String,
    cardinality: Cardinality,
    related_type: String,
    graphable: bool,
}

impl Relationship {
    /// A new relationship with the given external name, cardinality, and target type name.
    ///
    /// To-one relationships default to graphable, to-many relationships are never graphable.
    ///
    /// # Panics
    ///
    /// Panics if `name` contains a `.`.
    pub fn new(
        name: impl Into<String>,
        cardinality: Cardinality,
        related_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        assert!(
            !name.contains('.'),
            "relationship name {name:?} must not contain '.'"
        );
        Self {
            map_to: name.clone(),
            name,
            graphable: cardinality == Cardinality::One,
            cardinality,
            related_type: related_type.into(),
        }
    }

    /// A to-one relationship.
    pub fn to_one(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        Self::new(name, Cardinality::One, related_type)
    }

    /// A to-many relationship.
    pub fn to_many(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        Self::new(name, Cardinality::Many, related_type)
    }

    /// Map this relationship to a different internal key.
    ///
    /// # Panics
    ///
    /// Panics if `key` contains a `.`.
    pub fn mapped_to(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        assert!(
            !key.contains('.'),
            "relationship map_to key {key:?} must not contain '.'"
        );
        self.map_to = key;
        self
    }

    /// Set whether the field graph may traverse this relationship.
    ///
    /// Forced false for to-many relationships regardless of the requested value.
    pub fn graphable(mut self, graphable: bool) -> Self {
        self.graphable = graphable && self.cardinality == Cardinality::One;
        self
    }

    /// The external name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The internal key the related data hangs off of.
    pub fn map_to(&self) -> &str {
        &self.map_to
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The name of the resource type this relationship points at.
    pub fn related_type(&self) -> &str {
        &self.related_type
    }

    pub fn is_graphable(&self) -> bool {
        self.graphable
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_follow_cardinality() {
        assert!(Relationship::to_one("album", "albums").is_graphable());
        assert!(!Relationship::to_many("albums", "albums").is_graphable());
    }

    #[test]
    fn test_many_is_never_graphable() {
        let relationship = Relationship::to_many("albums", "albums").graphable(true);
        assert!(!relationship.is_graphable());
    }

    #[test]
    fn test_one_can_opt_out() {
        let relationship = Relationship::to_one("album", "albums").graphable(false);
        assert!(!relationship.is_graphable());
    }

    #[test]
    #[should_panic(expected = "must not contain '.'")]
    fn test_dotted_name_is_a_fault() {
        Relationship::to_one("album.artist", "artists");
    }
}
