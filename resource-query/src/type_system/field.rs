//! The field sum types.
//!
//! Attributes and relationships share one namespace on a resource type, and a field lookup can
//! resolve either locally (a plain field on the type itself) or through the registry's
//! precomputed graph (a possibly-nested field with a qualified name). Both distinctions are
//! tagged unions here, so callers pattern-match instead of poking at runtime type checks.

use super::attribute::Attribute;
use super::graph::GraphedField;
use super::relationship::Relationship;
use derive_more::From;

/// A field on a resource type: either a scalar attribute or a link to another type.
#[derive(Clone, Debug, From, PartialEq, Eq)]
pub enum Field {
    Attribute(Attribute),
    Relationship(Relationship),
}

impl Field {
    /// The external name.
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(attribute) => attribute.name(),
            Self::Relationship(relationship) => relationship.name(),
        }
    }

    /// The internal key.
    pub fn map_to(&self) -> &str {
        match self {
            Self::Attribute(attribute) => attribute.map_to(),
            Self::Relationship(relationship) => relationship.map_to(),
        }
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Self::Attribute(attribute) => Some(attribute),
            Self::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Attribute(_) => None,
            Self::Relationship(relationship) => Some(relationship),
        }
    }
}

/// A field as returned by a lookup: local to the type, or resolved through the field graph.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedField {
    /// A field looked up directly on an unregistered type.
    Local(Field),
    /// A field resolved through a registry's precomputed graph.
    Graphed(GraphedField),
}

impl ResolvedField {
    /// The underlying field.
    pub fn field(&self) -> &Field {
        match self {
            Self::Local(field) => field,
            Self::Graphed(graphed) => graphed.field(),
        }
    }

    /// The name this field resolves under: qualified for graphed fields, plain for local ones.
    pub fn name(&self) -> &str {
        match self {
            Self::Local(field) => field.name(),
            Self::Graphed(graphed) => graphed.qualified_name(),
        }
    }

    /// The ordered internal keys to read through nested data to reach this field's value.
    pub fn map_to_path(&self) -> Vec<&str> {
        match self {
            Self::Local(field) => vec![field.map_to()],
            Self::Graphed(graphed) => graphed.map_to_path().iter().map(String::as_str).collect(),
        }
    }

    /// The backend join alias for this field, if it sits behind a relationship chain.
    pub fn query_alias(&self) -> Option<&str> {
        match self {
            Self::Local(_) => None,
            Self::Graphed(graphed) => graphed.query_alias(),
        }
    }

    pub fn attribute(&self) -> Option<&Attribute> {
        self.field().as_attribute()
    }

    pub fn relationship(&self) -> Option<&Relationship> {
        self.field().as_relationship()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::DataType;

    #[test]
    fn test_local_resolution() {
        let field = Field::from(Attribute::new("title", DataType::String));
        let resolved = ResolvedField::Local(field);
        assert_eq!(resolved.name(), "title");
        assert_eq!(resolved.map_to_path(), vec!["title"]);
        assert_eq!(resolved.query_alias(), None);
        assert!(resolved.attribute().is_some());
        assert!(resolved.relationship().is_none());
    }
}
