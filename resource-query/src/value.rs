//! Runtime values and the data types that describe them.
//!
//! Client-supplied query input arrives untyped (usually as strings) and must be cast into the
//! declared type of the attribute it targets before it can be compared against stored data. This
//! module provides the two halves of that story: [`Value`], the closed set of runtime values the
//! engine understands, and [`DataType`], the matching closed set of type tags an attribute can
//! declare, with [`DataType::cast`] bridging the two.
//!
//! It also provides the type-dispatched ordering primitives ([`compare`], [`asc`], [`desc`],
//! [`eq`]) used by the in-memory backend. Ordering must dispatch on the runtime type of both
//! operands: a date compares as a date, not as whatever its display string happens to sort as,
//! and values of different types are simply unordered.

use chrono::NaiveDate;
use derive_more::From;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// An in-memory resource: a map from internal keys to values.
///
/// Related data hangs off [`Value::Map`] entries, so a record can be read through a multi-hop
/// `map_to` path with [`dig`].
pub type Record = BTreeMap<String, Value>;

/// A runtime value supported by the query engine.
#[derive(Clone, Debug, From, PartialEq)]
pub enum Value {
    /// A boolean.
    Boolean(bool),
    /// A calendar date with no time component.
    Date(NaiveDate),
    /// A floating-point number.
    Decimal(f64),
    /// A signed integer.
    Integer(i64),
    /// A text string.
    String(String),
    /// A homogeneous list of values.
    List(Vec<Value>),
    /// A nested map of values, used for related data embedded in a [`Record`].
    Map(Record),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Self::Integer(x.into())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Decimal(x) => write!(f, "{x}"),
            Self::Integer(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Value {
    /// The name of this value's runtime type, for error contexts.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Decimal(_) => "decimal",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

/// The declared type of an [`Attribute`](crate::type_system::Attribute).
///
/// This is a closed set matching the casting layer: every tag knows how to cast a raw [`Value`]
/// into its own shape, and backends can rely on there being no other shapes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Date,
    Decimal,
    Integer,
    String,
    /// A homogeneous list of the inner type.
    List(Box<DataType>),
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Decimal => write!(f, "decimal"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

impl DataType {
    /// Wrap this type in a homogeneous list.
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Cast a raw value into this type.
    ///
    /// Raw input is typically a string; a value already of the target type passes through
    /// unchanged. Casting a scalar against a list type wraps the cast scalar in a one-element
    /// list. Returns [`None`] when the value cannot represent the target type.
    pub fn cast(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Boolean, Value::Boolean(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(s)) => match s.trim() {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            (Self::Date, Value::Date(_)) => Some(value.clone()),
            (Self::Date, Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            (Self::Decimal, Value::Decimal(_)) => Some(value.clone()),
            (Self::Decimal, Value::Integer(x)) => Some(Value::Decimal(*x as f64)),
            (Self::Decimal, Value::String(s)) => s.trim().parse().ok().map(Value::Decimal),
            (Self::Integer, Value::Integer(_)) => Some(value.clone()),
            (Self::Integer, Value::String(s)) => s.trim().parse().ok().map(Value::Integer),
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::String, Value::Boolean(_) | Value::Date(_) | Value::Decimal(_) | Value::Integer(_)) => {
                Some(Value::String(value.to_string()))
            }
            (Self::List(inner), Value::List(items)) => items
                .iter()
                .map(|item| inner.cast(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            (Self::List(inner), _) => inner.cast(value).map(|cast| Value::List(vec![cast])),
            _ => None,
        }
    }
}

/// Compare two values of the same runtime type.
///
/// Integers and decimals compare across the numeric divide; every other pairing of distinct
/// types, and any pairing involving a list or map, is unordered.
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
        (Value::Date(l), Value::Date(r)) => Some(l.cmp(r)),
        (Value::Decimal(l), Value::Decimal(r)) => Some(l.total_cmp(r)),
        (Value::Decimal(l), Value::Integer(r)) => Some(l.total_cmp(&(*r as f64))),
        (Value::Integer(l), Value::Decimal(r)) => Some((*l as f64).total_cmp(r)),
        (Value::Integer(l), Value::Integer(r)) => Some(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Are two values equal under the same dispatch rules as [`compare`]?
pub fn eq(lhs: &Value, rhs: &Value) -> bool {
    lhs == rhs || compare(lhs, rhs) == Some(Ordering::Equal)
}

/// Ascending ordering over possibly-missing values.
///
/// A missing value sorts before any present one; values [`compare`] cannot order are treated as
/// equal so that later sort keys can break the tie.
pub fn asc(lhs: Option<&Value>, rhs: Option<&Value>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
    }
}

/// Descending ordering over possibly-missing values.
pub fn desc(lhs: Option<&Value>, rhs: Option<&Value>) -> Ordering {
    asc(lhs, rhs).reverse()
}

/// Read a value out of a record by following a `map_to` path through nested maps.
///
/// Returns [`None`] if any hop along the path is absent or lands on a non-map value.
pub fn dig<'a, P>(record: &'a Record, path: P) -> Option<&'a Value>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    let mut hops = path.into_iter();
    let mut current = record.get(hops.next()?.as_ref())?;
    for hop in hops {
        match current {
            Value::Map(nested) => current = nested.get(hop.as_ref())?,
            _ => return None,
        }
    }
    Some(current)
}
