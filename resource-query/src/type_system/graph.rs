//! Field graph construction.
//!
//! A field graph flattens everything reachable from a root type — its own fields plus, through
//! graphable relationships, the fields of related types — into one map keyed by dotted
//! qualified name. The traversal is bounded by the root type's `max_depth`, which is the only
//! thing preventing infinite recursion through cyclic type references (album → artist →
//! albums); there is no separate cycle detection.

use super::field::Field;
use super::resource::ResourceType;
use std::collections::BTreeMap;

/// A field annotated with its position in a field graph relative to some root type.
///
/// The `parent` back-reference is the qualified name of the graphed relationship one level up,
/// resolved on demand against the graph map itself rather than held as a pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphedField {
    field: Field,
    qualified_name: String,
    map_to_path: Vec<String>,
    parent: Option<String>,
    query_alias: Option<String>,
}

impl GraphedField {
    /// The underlying field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The unqualified name of the underlying field.
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// The dot-joined path from the root type, e.g. `"album.artist.name"`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The ordered internal keys to read through nested data to reach this field's value.
    pub fn map_to_path(&self) -> &[String] {
        &self.map_to_path
    }

    /// The qualified name of the graphed field one level up, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// An alias hint for backends that join related data in under a name.
    ///
    /// Opaque to the core; the SQL backend uses it as the table alias qualifying this field's
    /// column.
    pub fn query_alias(&self) -> Option<&str> {
        self.query_alias.as_deref()
    }
}

/// Flatten every field reachable from `root` into a map keyed by qualified name.
///
/// Attributes are inserted at any depth. A relationship is inserted, and recursed into, only
/// when it is graphable and there is depth remaining to spend on the hop; non-graphable
/// relationships (every to-many link) never appear in a graph and stay reachable through local
/// lookup only.
///
/// # Panics
///
/// Panics if a graphable relationship names a type absent from `types`. This is a registry
/// configuration error and is detected here, at build time, rather than at request time.
pub(crate) fn build_field_graph(
    types: &BTreeMap<String, ResourceType>,
    root: &str,
) -> BTreeMap<String, GraphedField> {
    let root_type = &types[root];
    let mut graph = BTreeMap::new();
    visit(
        types,
        root_type,
        root_type.max_depth() as i64,
        None,
        &[],
        &mut graph,
    );
    graph
}

fn visit(
    types: &BTreeMap<String, ResourceType>,
    resource_type: &ResourceType,
    depth: i64,
    prefix: Option<&str>,
    path_prefix: &[String],
    graph: &mut BTreeMap<String, GraphedField>,
) {
    if depth < 0 {
        return;
    }
    for field in resource_type.fields() {
        let qualified_name = match prefix {
            Some(prefix) => format!("{prefix}.{}", field.name()),
            None => field.name().to_owned(),
        };
        let mut map_to_path = path_prefix.to_vec();
        map_to_path.push(field.map_to().to_owned());
        let graphed = GraphedField {
            field: field.clone(),
            qualified_name: qualified_name.clone(),
            map_to_path: map_to_path.clone(),
            parent: prefix.map(str::to_owned),
            query_alias: prefix.map(str::to_owned),
        };
        match field {
            Field::Attribute(_) => {
                graph.insert(qualified_name, graphed);
            }
            Field::Relationship(relationship) if relationship.is_graphable() && depth > 0 => {
                let related = types.get(relationship.related_type()).unwrap_or_else(|| {
                    panic!(
                        "resource type {:?} relationship {:?} references unknown type {:?}",
                        resource_type.name(),
                        relationship.name(),
                        relationship.related_type()
                    )
                });
                graph.insert(qualified_name.clone(), graphed);
                visit(
                    types,
                    related,
                    depth - 1,
                    Some(&qualified_name),
                    &map_to_path,
                    graph,
                );
            }
            Field::Relationship(_) => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::type_system::{Attribute, Relationship};
    use crate::value::DataType;

    fn music_types(song_depth: u32) -> BTreeMap<String, ResourceType> {
        let artists = ResourceType::new("artists")
            .put_field(Attribute::new("name", DataType::String).queryable())
            .put_field(Relationship::to_many("albums", "albums"));
        let albums = ResourceType::new("albums")
            .put_field(Attribute::new("title", DataType::String).queryable())
            .put_field(Relationship::to_one("artist", "artists"));
        let songs = ResourceType::new("songs")
            .with_max_depth(song_depth)
            .put_field(Attribute::new("title", DataType::String).queryable())
            .put_field(Relationship::to_one("album", "albums"));
        [artists, albums, songs]
            .into_iter()
            .map(|resource_type| (resource_type.name().to_owned(), resource_type))
            .collect()
    }

    #[test]
    fn test_depth_one_stops_after_one_hop() {
        let graph = build_field_graph(&music_types(1), "songs");
        assert!(graph.contains_key("title"));
        assert!(graph.contains_key("album"));
        assert!(graph.contains_key("album.title"));
        assert!(!graph.contains_key("album.artist"));
        assert!(!graph.contains_key("album.artist.name"));
    }

    #[test]
    fn test_depth_two_adds_the_next_hop_but_never_many() {
        let graph = build_field_graph(&music_types(2), "songs");
        assert!(graph.contains_key("album.artist"));
        assert!(graph.contains_key("album.artist.name"));
        // The artist.albums many-relationship is never traversed, at any depth.
        assert!(!graph.contains_key("album.artist.albums"));
        let graph = build_field_graph(&music_types(5), "songs");
        assert!(!graph.contains_key("album.artist.albums"));
        assert!(!graph.contains_key("album.artist.albums.title"));
    }

    #[test]
    fn test_graphed_field_annotations() {
        let graph = build_field_graph(&music_types(2), "songs");
        let name = &graph["album.artist.name"];
        assert_eq!(name.qualified_name(), "album.artist.name");
        assert_eq!(name.map_to_path(), ["album", "artist", "name"]);
        assert_eq!(name.parent(), Some("album.artist"));
        assert_eq!(name.query_alias(), Some("album.artist"));

        let album = &graph["album"];
        assert_eq!(album.parent(), None);
        assert_eq!(album.query_alias(), None);
    }

    #[test]
    fn test_depth_zero_keeps_local_fields_only() {
        let graph = build_field_graph(&music_types(0), "songs");
        assert!(graph.contains_key("title"));
        assert!(!graph.contains_key("album"));
        assert!(!graph.contains_key("album.title"));
    }

    #[test]
    #[should_panic(expected = "references unknown type")]
    fn test_dangling_related_type_is_a_fault() {
        let mut types = music_types(1);
        types.remove("albums");
        build_field_graph(&types, "songs");
    }

    #[test]
    fn test_self_reference_is_bounded_by_depth() {
        let people = ResourceType::new("people")
            .with_max_depth(2)
            .put_field(Attribute::new("name", DataType::String))
            .put_field(Relationship::to_one("manager", "people"));
        let types: BTreeMap<_, _> = [("people".to_owned(), people)].into();
        let graph = build_field_graph(&types, "people");
        assert!(graph.contains_key("manager.manager.name"));
        assert!(!graph.contains_key("manager.manager.manager"));
    }
}
