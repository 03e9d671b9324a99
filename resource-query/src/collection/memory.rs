//! The in-memory reference backend.
//!
//! Useful for fixtures, tests, and small datasets that never touch a database. Comparisons are
//! type-aware throughout: values compare via [`value::compare`]'s runtime-type dispatch, so
//! dates order as dates and a date never compares against, say, an integer.

use super::{Countable, Delegate};
use crate::query::{Filter, Operator, Page, Sorter};
use crate::value::{self, Record, Value};
use itertools::Itertools;
use std::cmp::Ordering;

/// An ordered in-memory sequence of records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records(Vec<Record>);

impl From<Vec<Record>> for Records {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl FromIterator<Record> for Records {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Records {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn into_records(self) -> Vec<Record> {
        self.0
    }
}

impl Delegate for Records {
    type Output = Vec<Record>;

    fn filter(mut self, filters: &[Filter]) -> Self {
        tracing::debug!("FILTER {} records by {} conditions", self.0.len(), filters.len());
        self.0
            .retain(|record| filters.iter().all(|filter| matches(record, filter)));
        self
    }

    fn sort(mut self, sorters: &[Sorter]) -> Self {
        if sorters.is_empty() {
            return self;
        }
        tracing::debug!("SORT {} records by {} keys", self.0.len(), sorters.len());
        // Cascade: the first key decides the order unless it ties, in which case the next key
        // is consulted, and so on. The sort is stable, so full ties keep their input order.
        self.0 = self
            .0
            .into_iter()
            .sorted_by(|a, b| {
                sorters.iter().fold(Ordering::Equal, |ordering, sorter| {
                    ordering.then_with(|| {
                        let lhs = value::dig(a, sorter.field().map_to_path());
                        let rhs = value::dig(b, sorter.field().map_to_path());
                        if sorter.direction().is_descending() {
                            value::desc(lhs, rhs)
                        } else {
                            value::asc(lhs, rhs)
                        }
                    })
                })
            })
            .collect();
        self
    }

    fn paginate(mut self, page: Page) -> Self {
        let Some(limit) = page.limit() else {
            return self;
        };
        tracing::debug!("PAGE {} size {}", page.number, page.size);
        self.0 = self
            .0
            .into_iter()
            .skip(page.offset() as usize)
            .take(limit as usize)
            .collect();
        self
    }

    fn all(self) -> Vec<Record> {
        self.0
    }
}

impl Countable for Records {
    fn total(&self) -> usize {
        self.0.len()
    }
}

fn matches(record: &Record, filter: &Filter) -> bool {
    let actual = value::dig(record, filter.field().map_to_path());
    let Some(actual) = actual else {
        // A missing value matches nothing, except the negated operators.
        return matches!(filter.operator(), Operator::Not | Operator::Exclude);
    };
    let expected = filter.value();
    match filter.operator() {
        Operator::Eq => value::eq(actual, expected),
        Operator::Not => !value::eq(actual, expected),
        Operator::Gt => value::compare(actual, expected) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            value::compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => value::compare(actual, expected) == Some(Ordering::Less),
        Operator::Lte => matches!(
            value::compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::StartsWith => match (actual, expected) {
            (Value::String(actual), Value::String(prefix)) => actual.starts_with(prefix),
            _ => false,
        },
        Operator::Include => includes(actual, expected),
        Operator::Exclude => !includes(actual, expected),
    }
}

fn includes(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::List(items) => items.iter().any(|item| value::eq(actual, item)),
        Value::String(needle) => {
            matches!(actual, Value::String(haystack) if haystack.contains(needle))
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collection;
    use crate::type_system::{Attribute, ResourceType};
    use crate::value::DataType;

    fn albums_type() -> ResourceType {
        ResourceType::new("albums")
            .put_field(Attribute::new("artist", DataType::String).queryable())
            .put_field(Attribute::new("title", DataType::String).queryable())
            .put_field(Attribute::new("tracks", DataType::Integer).queryable())
            .put_field(Attribute::new("releaseDate", DataType::Date).mapped_to("release_date").queryable())
    }

    fn album(artist: &str, title: &str, tracks: i64, released: &str) -> Record {
        let released = DataType::Date.cast(&Value::from(released)).unwrap();
        [
            ("artist".to_owned(), Value::from(artist)),
            ("title".to_owned(), Value::from(title)),
            ("tracks".to_owned(), Value::Integer(tracks)),
            ("release_date".to_owned(), released),
        ]
        .into()
    }

    fn albums() -> Records {
        Records::from(vec![
            album("Duran Duran", "Rio", 9, "1982-05-10"),
            album("Kate Bush", "Hounds of Love", 12, "1985-09-16"),
            album("Duran Duran", "Seven and the Ragged Tiger", 13, "1983-11-21"),
            album("Talking Heads", "Remain in Light", 8, "1980-10-08"),
        ])
    }

    fn titles(records: Vec<Record>) -> Vec<String> {
        records
            .into_iter()
            .map(|record| record["title"].to_string())
            .collect()
    }

    #[test]
    fn test_filter_is_type_aware() {
        let albums_type = albums_type();
        let query = collection::Query {
            filters: vec![albums_type.validate_filter(("releaseDate lt", "1983-01-01")).unwrap()],
            ..Default::default()
        };
        let matched = collection::all(albums(), &query);
        assert_eq!(
            titles(matched),
            vec!["Rio".to_owned(), "Remain in Light".to_owned()]
        );
    }

    #[test]
    fn test_filter_include_and_starts_with() {
        let albums_type = albums_type();
        let query = collection::Query {
            filters: vec![albums_type
                .validate_filter(("tracks in", Value::List(vec![Value::from("9"), Value::from("13")])))
                .unwrap()],
            ..Default::default()
        };
        assert_eq!(collection::all(albums(), &query).len(), 2);

        let query = collection::Query {
            filters: vec![albums_type.validate_filter("title sw R").unwrap()],
            ..Default::default()
        };
        assert_eq!(
            titles(collection::all(albums(), &query)),
            vec!["Rio".to_owned(), "Remain in Light".to_owned()]
        );
    }

    #[test]
    fn test_secondary_sort_key_breaks_ties() {
        let albums_type = albums_type();
        let query = collection::Query {
            sorters: vec![
                albums_type.validate_sorter("-artist").unwrap(),
                albums_type.validate_sorter("-tracks").unwrap(),
            ],
            ..Default::default()
        };
        let sorted = collection::all(albums(), &query);
        let artists_and_tracks: Vec<_> = sorted
            .iter()
            .map(|record| (record["artist"].to_string(), record["tracks"].clone()))
            .collect();
        assert_eq!(
            artists_and_tracks,
            vec![
                ("Talking Heads".to_owned(), Value::Integer(8)),
                ("Kate Bush".to_owned(), Value::Integer(12)),
                // Tie on artist broken by descending track count.
                ("Duran Duran".to_owned(), Value::Integer(13)),
                ("Duran Duran".to_owned(), Value::Integer(9)),
            ]
        );
    }

    #[test]
    fn test_paginate_and_page_info() {
        let page = Page::new(2, 2);
        let query = collection::Query {
            page,
            ..Default::default()
        };
        let source = albums();
        let info = collection::page_info(&source, &query);
        assert_eq!(info.resources, 4);
        assert_eq!(info.total, 2);

        let paged = collection::all(source, &query);
        assert_eq!(paged.len(), 2);
    }

    #[test]
    fn test_size_sentinel_disables_pagination() {
        let query = collection::Query {
            page: Page::new(1, Page::ALL),
            ..Default::default()
        };
        assert_eq!(collection::all(albums(), &query).len(), 4);
    }

    #[test]
    fn test_missing_values_match_only_negated_operators() {
        let albums_type = albums_type();
        let mut sparse = album("Duran Duran", "Rio", 9, "1982-05-10");
        sparse.remove("tracks");
        let records = Records::from(vec![sparse]);

        let eq = collection::Query {
            filters: vec![albums_type.validate_filter(("tracks", 9)).unwrap()],
            ..Default::default()
        };
        assert!(collection::all(records.clone(), &eq).is_empty());

        let not = collection::Query {
            filters: vec![albums_type.validate_filter(("tracks not", 9)).unwrap()],
            ..Default::default()
        };
        assert_eq!(collection::all(records, &not).len(), 1);
    }
}
