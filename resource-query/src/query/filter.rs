//! Filter input parsing and the operator vocabulary.

use crate::error::{Error, ErrorKind};
use crate::type_system::ResolvedField;
use crate::value::Value;
use derive_more::Display;
use std::str::FromStr;

/// A filter comparison operator.
///
/// This is a closed vocabulary; each operator carries a compatibility rule checked against the
/// cast value's runtime shape during validation.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Equal. The default when input omits an operator.
    #[display(fmt = "eq")]
    Eq,
    /// Not equal.
    #[display(fmt = "not")]
    Not,
    /// Greater than.
    #[display(fmt = "gt")]
    Gt,
    /// Greater than or equal.
    #[display(fmt = "gte")]
    Gte,
    /// Less than.
    #[display(fmt = "lt")]
    Lt,
    /// Less than or equal.
    #[display(fmt = "lte")]
    Lte,
    /// String prefix match; strings only.
    #[display(fmt = "sw")]
    StartsWith,
    /// Membership in a set of values.
    #[display(fmt = "in")]
    Include,
    /// Exclusion from a set of values.
    #[display(fmt = "ex")]
    Exclude,
}

impl Operator {
    /// Every operator, in external-spelling order.
    pub const ALL: [Self; 9] = [
        Self::Eq,
        Self::Not,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::StartsWith,
        Self::Include,
        Self::Exclude,
    ];

    /// Does this operator take a list of values rather than a single one?
    ///
    /// Casting wraps the target type in a homogeneous list for these operators.
    pub fn takes_list(self) -> bool {
        matches!(self, Self::Include | Self::Exclude)
    }

    /// Is this operator compatible with the given (already cast) value's runtime shape?
    pub fn compatible_with(self, value: &Value) -> bool {
        match self {
            Self::Eq | Self::Not => true,
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => matches!(
                value,
                Value::Date(_) | Value::Decimal(_) | Value::Integer(_) | Value::String(_)
            ),
            Self::StartsWith => matches!(value, Value::String(_)),
            Self::Include | Self::Exclude => matches!(value, Value::String(_) | Value::List(_)),
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "eq" => Ok(Self::Eq),
            "not" => Ok(Self::Not),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "sw" => Ok(Self::StartsWith),
            "in" => Ok(Self::Include),
            "ex" => Ok(Self::Exclude),
            _ => Err(Error::new(ErrorKind::InvalidFilterOperator).with("operator", s)),
        }
    }
}

/// Raw filter input in any of its accepted surface forms.
///
/// All forms normalize to the same `(field, operator, value)` triple via [`parse`](Self::parse).
#[derive(Clone, Debug, PartialEq)]
pub enum FilterInput {
    /// A whole filter as one string: `"title eq Rio"`.
    Expression(String),
    /// A `"field [operator]"` key with a separate value, as query parameters deliver it.
    Pair(String, Value),
    /// Field, operator, and value, already separated.
    Triple(String, String, Value),
}

impl From<&str> for FilterInput {
    fn from(expr: &str) -> Self {
        Self::Expression(expr.into())
    }
}

impl From<String> for FilterInput {
    fn from(expr: String) -> Self {
        Self::Expression(expr)
    }
}

impl<V: Into<Value>> From<(&str, V)> for FilterInput {
    fn from((key, value): (&str, V)) -> Self {
        Self::Pair(key.into(), value.into())
    }
}

impl<V: Into<Value>> From<(&str, &str, V)> for FilterInput {
    fn from((field, operator, value): (&str, &str, V)) -> Self {
        Self::Triple(field.into(), operator.into(), value.into())
    }
}

impl FilterInput {
    /// Normalize this input into a `(field, operator, value)` triple.
    ///
    /// Pair keys split on whitespace into a field name and an optional operator, defaulting to
    /// [`Operator::Eq`]. Expressions split into exactly three whitespace-separated parts, the
    /// last of which is taken verbatim as a string value; anything else is `invalid_filter`. An
    /// unknown operator spelling is `invalid_filter_operator`.
    pub fn parse(self) -> Result<(String, Operator, Value), Error> {
        match self {
            Self::Triple(field, operator, value) => Ok((field, operator.parse()?, value)),
            Self::Pair(key, value) => {
                let mut parts = key.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(field), None, _) => Ok((field.into(), Operator::Eq, value)),
                    (Some(field), Some(operator), None) => {
                        Ok((field.into(), operator.parse()?, value))
                    }
                    _ => Err(Error::new(ErrorKind::InvalidFilter).with("filter", key.as_str())),
                }
            }
            Self::Expression(expr) => {
                let mut parts = expr.trim().splitn(3, ' ');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(field), Some(operator), Some(value)) if !field.is_empty() => {
                        Ok((field.into(), operator.parse()?, value.into()))
                    }
                    _ => Err(Error::new(ErrorKind::InvalidFilter).with("input", expr.as_str())),
                }
            }
        }
    }

    /// Like [`parse`](Self::parse), for call sites whose input has already been validated.
    ///
    /// # Panics
    ///
    /// Panics if the input is malformed.
    pub fn parse_expect(self) -> (String, Operator, Value) {
        self.parse()
            .unwrap_or_else(|error| panic!("malformed filter input: {error}"))
    }
}

/// A validated, canonical filter: a resolved field, an operator, and a cast value.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    field: ResolvedField,
    operator: Operator,
    value: Value,
}

impl Filter {
    /// Assemble a filter from already-validated parts.
    pub fn new(field: ResolvedField, operator: Operator, value: Value) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// The resolved field this filter applies to.
    pub fn field(&self) -> &ResolvedField {
        &self.field
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The cast comparison value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_expression_round_trip() {
        let (field, operator, value) = FilterInput::from("title eq Rio").parse().unwrap();
        assert_eq!(field, "title");
        assert_eq!(operator, Operator::Eq);
        assert_eq!(value, Value::from("Rio"));
    }

    #[test]
    fn test_expression_value_keeps_trailing_words() {
        let (_, _, value) = FilterInput::from("artist eq Duran Duran").parse().unwrap();
        assert_eq!(value, Value::from("Duran Duran"));
    }

    #[test]
    fn test_pair_defaults_to_eq() {
        let date = NaiveDate::from_ymd_opt(1982, 5, 10).unwrap();
        let (field, operator, value) = FilterInput::from(("release_date gte", Value::Date(date)))
            .parse()
            .unwrap();
        assert_eq!(field, "release_date");
        assert_eq!(operator, Operator::Gte);
        assert_eq!(value, Value::Date(date));

        let (field, operator, _) = FilterInput::from(("title", "Rio")).parse().unwrap();
        assert_eq!(field, "title");
        assert_eq!(operator, Operator::Eq);
    }

    #[test]
    fn test_malformed_expression_is_an_error() {
        // Two tokens are ambiguous: is "Rio" an operator or a value?
        let error = FilterInput::from("title Rio").parse().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidFilter);
        assert_eq!(error.get("input"), Some(&Value::from("title Rio")));
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let error = FilterInput::from(("title matches", "Rio")).parse().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidFilterOperator);
    }

    #[test]
    fn test_pair_with_too_many_tokens_is_an_error() {
        let error = FilterInput::from(("title eq what", "Rio")).parse().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidFilter);
    }

    #[test]
    #[should_panic(expected = "malformed filter input")]
    fn test_parse_expect_panics_on_malformed_input() {
        FilterInput::from("title Rio").parse_expect();
    }

    #[test]
    fn test_operator_compatibility() {
        assert!(Operator::StartsWith.compatible_with(&Value::from("Rio")));
        assert!(!Operator::StartsWith.compatible_with(&Value::Integer(9)));
        assert!(Operator::Include.compatible_with(&Value::List(vec![Value::Integer(1)])));
        assert!(!Operator::Include.compatible_with(&Value::Integer(1)));
        assert!(!Operator::Gt.compatible_with(&Value::Boolean(true)));
        assert!(Operator::Eq.compatible_with(&Value::Boolean(true)));
    }
}
