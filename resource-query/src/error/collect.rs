//! Error-as-value tree walking.
//!
//! Composite validations ("check these five filters and three sorters") must report every
//! problem in the request, not just the first one. The pattern is always the same: build a tree
//! of per-item results mirroring the shape of the input, then either unwrap the whole tree into
//! plain success values or flatten out every error it contains, tagging each with its position.
//! This module implements that walk once, over the four container shapes that arise in
//! practice: a success, an error, an ordered list, and a keyed map.
//!
//! A list position tags errors with its integer index, a map position with its key; the tags
//! accumulate into each error's `source` path, outermost segment first. The result is never a
//! mix: either every value unwrapped cleanly, or the complete error list in document order.

use super::Error;

/// A node in a tree of validation results.
#[derive(Clone, Debug)]
pub enum Node<T> {
    /// A successful result.
    Ok(T),
    /// A failed result.
    Err(Error),
    /// An ordered sequence of results; children are tagged with their index.
    List(Vec<Node<T>>),
    /// A keyed collection of results; children are tagged with their key.
    Map(Vec<(String, Node<T>)>),
}

impl<T> From<Result<T, Error>> for Node<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Err(error),
        }
    }
}

/// The success side of a collected [`Node`] tree: the same shape with every error removed.
#[derive(Clone, Debug, PartialEq)]
pub enum Collected<T> {
    Value(T),
    List(Vec<Collected<T>>),
    Map(Vec<(String, Collected<T>)>),
}

impl<T> Collected<T> {
    /// Unwrap a leaf value.
    ///
    /// # Panics
    ///
    /// Panics if this node is a list or map.
    pub fn into_value(self) -> T {
        match self {
            Self::Value(value) => value,
            _ => panic!("collected node is not a leaf value"),
        }
    }

    /// Unwrap a list of leaf values.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a list of leaves.
    pub fn into_values(self) -> Vec<T> {
        match self {
            Self::List(items) => items.into_iter().map(Collected::into_value).collect(),
            _ => panic!("collected node is not a list"),
        }
    }

    /// Unwrap a map of collected children.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a map.
    pub fn into_map(self) -> Vec<(String, Collected<T>)> {
        match self {
            Self::Map(entries) => entries,
            _ => panic!("collected node is not a map"),
        }
    }
}

impl<T> Node<T> {
    /// Walk the tree, returning either the fully unwrapped values or every error found.
    ///
    /// Errors are returned in document order, each tagged with the path of indices and keys
    /// leading to it.
    pub fn collect(self) -> Result<Collected<T>, Vec<Error>> {
        match self {
            Self::Ok(value) => Ok(Collected::Value(value)),
            Self::Err(error) => Err(vec![error]),
            Self::List(children) => {
                let mut values = Vec::new();
                let mut errors = Vec::new();
                for (index, child) in children.into_iter().enumerate() {
                    match child.collect() {
                        Ok(value) => values.push(value),
                        Err(found) => errors.extend(
                            found
                                .into_iter()
                                .map(|error| error.prepend_source(index as i64)),
                        ),
                    }
                }
                if errors.is_empty() {
                    Ok(Collected::List(values))
                } else {
                    Err(errors)
                }
            }
            Self::Map(children) => {
                let mut values = Vec::new();
                let mut errors = Vec::new();
                for (key, child) in children {
                    match child.collect() {
                        Ok(value) => values.push((key, value)),
                        Err(found) => errors.extend(
                            found
                                .into_iter()
                                .map(|error| error.prepend_source(key.as_str())),
                        ),
                    }
                }
                if errors.is_empty() {
                    Ok(Collected::Map(values))
                } else {
                    Err(errors)
                }
            }
        }
    }
}

/// Collect a flat list of results, tagging each error with its index.
pub fn list<T, I>(items: I) -> Result<Vec<T>, Vec<Error>>
where
    I: IntoIterator<Item = Result<T, Error>>,
{
    Node::List(items.into_iter().map(Node::from).collect())
        .collect()
        .map(Collected::into_values)
}

/// Collect a flat keyed collection of results, tagging each error with its key.
pub fn keyed<T, I>(items: I) -> Result<Vec<(String, T)>, Vec<Error>>
where
    I: IntoIterator<Item = (String, Result<T, Error>)>,
{
    Node::Map(
        items
            .into_iter()
            .map(|(key, result)| (key, Node::from(result)))
            .collect(),
    )
    .collect()
    .map(|collected| {
        collected
            .into_map()
            .into_iter()
            .map(|(key, value)| (key, value.into_value()))
            .collect()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Value;

    fn error(kind: ErrorKind) -> Error {
        Error::new(kind)
    }

    #[test]
    fn test_all_ok_unwraps() {
        let values = list([Ok(1), Ok(2), Ok(3)]).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_tags_indices() {
        let errors = list([Ok(1), Err(error(ErrorKind::InvalidFilter)), Err(error(ErrorKind::InvalidSorter))])
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].source_path(), &[Value::Integer(1)]);
        assert_eq!(errors[1].source_path(), &[Value::Integer(2)]);
    }

    #[test]
    fn test_keyed_tags_keys() {
        let errors = keyed([
            ("title eq".to_string(), Ok(1)),
            ("tracks gt".to_string(), Err(error(ErrorKind::TypeCastFailure))),
        ])
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_path(), &[Value::from("tracks gt")]);
    }

    #[test]
    fn test_nested_paths_accumulate_outside_in() {
        let tree: Node<i64> = Node::Map(vec![(
            "albums".into(),
            Node::List(vec![Node::Ok(1), Node::Err(error(ErrorKind::InvalidField))]),
        )]);
        let errors = tree.collect().unwrap_err();
        assert_eq!(
            errors[0].source_path(),
            &[Value::from("albums"), Value::Integer(1)]
        );
    }

    #[test]
    fn test_errors_beat_values() {
        let tree: Node<i64> = Node::List(vec![
            Node::Ok(1),
            Node::Map(vec![("k".into(), Node::Err(error(ErrorKind::InvalidField)))]),
        ]);
        assert!(tree.collect().is_err());
    }
}
