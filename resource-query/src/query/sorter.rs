//! Sort input parsing.

use crate::error::{Error, ErrorKind};
use crate::type_system::ResolvedField;
use derive_more::Display;

/// The direction of one sort key.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    #[display(fmt = "asc")]
    Asc,
    #[display(fmt = "desc")]
    Desc,
}

impl Direction {
    /// The sort-string prefix for this direction.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Asc => "+",
            Self::Desc => "-",
        }
    }

    pub fn is_descending(self) -> bool {
        self == Self::Desc
    }
}

/// Raw sorter input in either of its accepted surface forms.
#[derive(Clone, Debug, PartialEq)]
pub enum SorterInput {
    /// One sort segment: a field name with an optional `+`/`-` prefix.
    Expression(String),
    /// Direction and field name, already separated.
    Pair(Direction, String),
}

impl From<&str> for SorterInput {
    fn from(segment: &str) -> Self {
        Self::Expression(segment.into())
    }
}

impl From<String> for SorterInput {
    fn from(segment: String) -> Self {
        Self::Expression(segment)
    }
}

impl From<(Direction, &str)> for SorterInput {
    fn from((direction, field): (Direction, &str)) -> Self {
        Self::Pair(direction, field.into())
    }
}

impl SorterInput {
    /// Normalize this input into a `(direction, field)` pair.
    ///
    /// An unprefixed segment sorts ascending. An empty segment, a bare prefix, or embedded
    /// whitespace is `invalid_sorter`.
    pub fn parse(self) -> Result<(Direction, String), Error> {
        match self {
            Self::Pair(direction, field) => Ok((direction, field)),
            Self::Expression(segment) => {
                let trimmed = segment.trim();
                let (direction, field) = match trimmed.strip_prefix('-') {
                    Some(rest) => (Direction::Desc, rest),
                    None => (Direction::Asc, trimmed.strip_prefix('+').unwrap_or(trimmed)),
                };
                if field.is_empty() || field.contains(char::is_whitespace) {
                    return Err(
                        Error::new(ErrorKind::InvalidSorter).with("input", segment.as_str())
                    );
                }
                Ok((direction, field.into()))
            }
        }
    }

    /// Like [`parse`](Self::parse), for call sites whose input has already been validated.
    ///
    /// # Panics
    ///
    /// Panics if the input is malformed.
    pub fn parse_expect(self) -> (Direction, String) {
        self.parse()
            .unwrap_or_else(|error| panic!("malformed sorter input: {error}"))
    }
}

/// A validated, canonical sort key: a resolved field and a direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Sorter {
    direction: Direction,
    field: ResolvedField,
}

impl Sorter {
    /// Assemble a sorter from already-validated parts.
    pub fn new(direction: Direction, field: ResolvedField) -> Self {
        Self { direction, field }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn field(&self) -> &ResolvedField {
        &self.field
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(
            SorterInput::from("-releaseDate").parse().unwrap(),
            (Direction::Desc, "releaseDate".into())
        );
        assert_eq!(
            SorterInput::from("+title").parse().unwrap(),
            (Direction::Asc, "title".into())
        );
        assert_eq!(
            SorterInput::from("title").parse().unwrap(),
            (Direction::Asc, "title".into())
        );
    }

    #[test]
    fn test_malformed_segments() {
        for segment in ["", "-", "+", "title desc"] {
            let error = SorterInput::from(segment).parse().unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidSorter, "segment {segment:?}");
        }
    }

    #[test]
    #[should_panic(expected = "malformed sorter input")]
    fn test_parse_expect_panics_on_malformed_input() {
        SorterInput::from("-").parse_expect();
    }
}
