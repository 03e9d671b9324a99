//! Scalar value fields.

use crate::error::{Error, ErrorKind};
use crate::query::{Direction, Operator};
use crate::value::{DataType, Value};

/// A scalar field on a resource type.
///
/// An attribute maps an external name to an internal key, declares a [`DataType`], and carries
/// the per-field permissions deciding whether clients may filter or sort by it. Attributes are
/// immutable; the builder methods each return a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    map_to: String,
    data_type: DataType,
    filterable: bool,
    sortable: bool,
}

impl Attribute {
    /// A new attribute with the given external name and data type.
    ///
    /// The internal key defaults to the external name, and querying permissions default to
    /// disallowed.
    ///
    /// # Panics
    ///
    /// Panics if `name` contains a `.`, which is reserved for separating nested field names.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        assert!(
            !name.contains('.'),
            "attribute name {name:?} must not contain '.'"
        );
        Self {
            map_to: name.clone(),
            name,
            data_type,
            filterable: false,
            sortable: false,
        }
    }

    /// Map this attribute to a different internal key.
    ///
    /// # Panics
    ///
    /// Panics if `key` contains a `.`; nesting is expressed through relationships, not keys.
    pub fn mapped_to(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        assert!(
            !key.contains('.'),
            "attribute map_to key {key:?} must not contain '.'"
        );
        self.map_to = key;
        self
    }

    /// Allow clients to filter by this attribute.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Allow clients to sort by this attribute.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Allow clients to both filter and sort by this attribute.
    pub fn queryable(self) -> Self {
        self.filterable().sortable()
    }

    /// The external name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The internal key this attribute reads from.
    pub fn map_to(&self) -> &str {
        &self.map_to
    }

    /// The declared data type.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn can_filter(&self) -> bool {
        self.filterable
    }

    pub fn can_sort(&self) -> bool {
        self.sortable
    }

    /// Cast a raw value into this attribute's declared type.
    ///
    /// With `as_list`, the target type is wrapped in a homogeneous list first; operators that
    /// take a set of values cast through this path.
    pub fn cast(&self, value: &Value, as_list: bool) -> Result<Value, Error> {
        let target = if as_list {
            self.data_type.clone().list()
        } else {
            self.data_type.clone()
        };
        target.cast(value).ok_or_else(|| {
            Error::new(ErrorKind::TypeCastFailure)
                .with("attribute", self.name.as_str())
                .with("input", value.clone())
                .with("type", self.data_type.to_string())
        })
    }

    /// Validate one filter against this attribute, returning the operator and cast value.
    ///
    /// Fails with `cannot_filter_by_attribute` when filtering is not allowed, with
    /// `type_cast_failure` when the value cannot be cast, and with `invalid_filter_operator`
    /// when the operator is incompatible with the cast value's shape.
    pub fn validate_filter(
        &self,
        operator: Operator,
        value: &Value,
    ) -> Result<(Operator, Value), Error> {
        if !self.filterable {
            return Err(Error::new(ErrorKind::CannotFilterByAttribute)
                .with("attribute", self.name.as_str()));
        }
        let cast = self.cast(value, operator.takes_list())?;
        if !operator.compatible_with(&cast) {
            return Err(Error::new(ErrorKind::InvalidFilterOperator)
                .with("attribute", self.name.as_str())
                .with("operator", operator.to_string())
                .with("value", cast));
        }
        Ok((operator, cast))
    }

    /// Validate one sort key against this attribute.
    ///
    /// Fails with `cannot_sort_by_attribute` when sorting is not allowed.
    pub fn validate_sorter(&self, direction: Direction) -> Result<Direction, Error> {
        if !self.sortable {
            return Err(
                Error::new(ErrorKind::CannotSortByAttribute).with("attribute", self.name.as_str())
            );
        }
        Ok(direction)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn tracks() -> Attribute {
        Attribute::new("tracks", DataType::Integer).queryable()
    }

    #[test]
    #[should_panic(expected = "must not contain '.'")]
    fn test_dotted_name_is_a_fault() {
        Attribute::new("album.title", DataType::String);
    }

    #[test]
    fn test_cast_failure_context_shape() {
        let error = tracks().cast(&Value::from("X"), false).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeCastFailure);
        let context: Vec<_> = error.context().iter().collect();
        assert_eq!(
            context,
            vec![
                (&"attribute", &Value::from("tracks")),
                (&"input", &Value::from("X")),
                (&"type", &Value::from("integer")),
            ]
        );
    }

    #[test]
    fn test_validate_filter_casts_and_checks_permissions() {
        let (operator, value) = tracks()
            .validate_filter(Operator::Gte, &Value::from("9"))
            .unwrap();
        assert_eq!(operator, Operator::Gte);
        assert_eq!(value, Value::Integer(9));

        let hidden = Attribute::new("tracks", DataType::Integer);
        let error = hidden
            .validate_filter(Operator::Eq, &Value::from("9"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CannotFilterByAttribute);
    }

    #[test]
    fn test_validate_filter_wraps_list_operators() {
        let (_, value) = tracks()
            .validate_filter(Operator::Include, &Value::from("9"))
            .unwrap();
        assert_eq!(value, Value::List(vec![Value::Integer(9)]));
    }

    #[test]
    fn test_incompatible_operator_shape() {
        let error = tracks()
            .validate_filter(Operator::StartsWith, &Value::from("9"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidFilterOperator);
    }

    #[test]
    fn test_validate_sorter_checks_permissions() {
        assert_eq!(
            tracks().validate_sorter(Direction::Desc).unwrap(),
            Direction::Desc
        );
        let hidden = Attribute::new("tracks", DataType::Integer);
        let error = hidden.validate_sorter(Direction::Asc).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CannotSortByAttribute);
    }

    proptest! {
        #[test]
        fn test_dot_free_names_round_trip(name in "[a-zA-Z][a-zA-Z0-9_]{0,15}") {
            let attribute = Attribute::new(name.as_str(), DataType::String);
            prop_assert_eq!(attribute.name(), name.as_str());
            prop_assert_eq!(attribute.map_to(), name.as_str());
        }
    }
}
