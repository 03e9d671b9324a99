//! The request-parameter validation surface.
//!
//! This is the intended public entry point for request handling: hand [`validate`] the raw
//! query parameters a web layer extracted — filters, sort, sparse fieldsets, includes, page —
//! and get back either a fully merged, typed [`Options`] or the complete list of structured
//! errors. Every error carries a `source` path (`["filter", "releaseDate lt"]`, `["sort", 0]`)
//! locating the offending piece of input, so a caller can serialize field-level feedback
//! directly. A request that is partly valid is never partly executed: it is all of [`Options`]
//! or all errors.
//!
//! The raw shapes mirror the common web conventions: `filter` is a map of `"field [operator]"`
//! keys to values, `sort` and `include` are comma-separated strings or lists, `fields` maps a
//! type name to a comma-separated string or list, and `page` carries `number`/`size` as
//! strings to be cast.

use crate::collection;
use crate::error::collect::Node;
use crate::error::{Context, Error, ErrorKind};
use crate::query::{Filter, FilterInput, Page, Sorter};
use crate::type_system::ResourceType;
use crate::value::Value;
use std::collections::BTreeMap;

/// A comma-separated string, or an already-split list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListInput {
    One(String),
    Many(Vec<String>),
}

impl ListInput {
    /// The individual segments, trimmed, with empty segments dropped.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::One(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
            Self::Many(segments) => segments.clone(),
        }
    }
}

impl From<&str> for ListInput {
    fn from(joined: &str) -> Self {
        Self::One(joined.into())
    }
}

impl From<String> for ListInput {
    fn from(joined: String) -> Self {
        Self::One(joined)
    }
}

impl From<Vec<&str>> for ListInput {
    fn from(segments: Vec<&str>) -> Self {
        Self::Many(segments.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for ListInput {
    fn from(segments: Vec<String>) -> Self {
        Self::Many(segments)
    }
}

/// Raw request parameters, as a web layer would deliver them.
///
/// Filter order is preserved so that errors report in the order the client wrote them.
#[derive(Clone, Debug, Default)]
pub struct Params {
    filter: Vec<(String, Value)>,
    sort: Option<ListInput>,
    fields: Vec<(String, ListInput)>,
    include: Option<ListInput>,
    page: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one filter entry: a `"field [operator]"` key and a value.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push((key.into(), value.into()));
        self
    }

    /// Set the sort input.
    pub fn sort(mut self, sort: impl Into<ListInput>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Add a sparse fieldset for one type.
    pub fn fields(mut self, type_name: impl Into<String>, names: impl Into<ListInput>) -> Self {
        self.fields.push((type_name.into(), names.into()));
        self
    }

    /// Set the include input.
    pub fn include(mut self, include: impl Into<ListInput>) -> Self {
        self.include = Some(include.into());
        self
    }

    /// Add one page entry (`"number"` or `"size"`) as an uncast string.
    pub fn page(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.page.push((key.into(), value.into()));
        self
    }
}

/// Validation configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// An upper bound on the page size a client may request.
    pub max_page_size: Option<u64>,
}

/// The fully validated, merged option set for one request.
#[derive(Clone, Debug)]
pub struct Options {
    pub filters: Vec<Filter>,
    pub sorters: Vec<Sorter>,
    /// Validated sparse fieldsets, keyed by type name.
    pub fields: BTreeMap<String, Vec<String>>,
    /// Validated relationship names to include.
    pub include: Vec<String>,
    pub page: Page,
}

impl Options {
    /// The collection-dispatch view of these options.
    pub fn to_query(&self) -> collection::Query {
        collection::Query {
            filters: self.filters.clone(),
            sorters: self.sorters.clone(),
            page: self.page,
        }
    }
}

/// Validate everything, collecting all errors.
///
/// Returns the merged [`Options`] only when every parameter validated; otherwise returns every
/// error found, in parameter order (filter, sort, fields, include, page), each tagged with its
/// source path.
pub fn validate(
    resource_type: &ResourceType,
    params: &Params,
    config: &Config,
) -> Result<Options, Vec<Error>> {
    let mut errors = Vec::new();
    let filters = section(validate_filters(resource_type, params), &mut errors);
    let sorters = section(validate_sorters(resource_type, params), &mut errors);
    let fields = section(validate_fields(resource_type, params), &mut errors);
    let include = section(validate_include(resource_type, params), &mut errors);
    let page = section(validate_page(params, config), &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }
    tracing::debug!(
        resource_type = resource_type.name(),
        "validated query parameters"
    );
    Ok(Options {
        filters: filters.unwrap(),
        sorters: sorters.unwrap(),
        fields: fields.unwrap(),
        include: include.unwrap(),
        page: page.unwrap(),
    })
}

fn section<T>(result: Result<T, Vec<Error>>, errors: &mut Vec<Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(found) => {
            errors.extend(found);
            None
        }
    }
}

/// Partition a section's results, tagging every error with the section name.
fn finish<T>(name: &str, results: Vec<Result<T, Error>>) -> Result<Vec<T>, Vec<Error>> {
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error.prepend_source(name)),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

fn validate_filters(resource_type: &ResourceType, params: &Params) -> Result<Vec<Filter>, Vec<Error>> {
    let results = params
        .filter
        .iter()
        .map(|(key, value)| {
            resource_type
                .validate_filter(FilterInput::Pair(key.clone(), value.clone()))
                .map_err(|error| error.prepend_source(key.as_str()))
        })
        .collect();
    let results = resource_type.validate_max_filters(results, Context::new());
    finish("filter", results)
}

fn validate_sorters(resource_type: &ResourceType, params: &Params) -> Result<Vec<Sorter>, Vec<Error>> {
    let Some(sort) = &params.sort else {
        return Ok(Vec::new());
    };
    let results = sort
        .segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            resource_type
                .validate_sorter(segment.as_str())
                .map_err(|error| error.prepend_source(index as i64))
        })
        .collect();
    let results = resource_type.validate_max_sorters(results, Context::new());
    finish("sort", results)
}

fn validate_fields(
    resource_type: &ResourceType,
    params: &Params,
) -> Result<BTreeMap<String, Vec<String>>, Vec<Error>> {
    let entries = params
        .fields
        .iter()
        .map(|(type_name, names)| {
            let node = match resolve_fieldset_type(resource_type, type_name) {
                Err(error) => Node::Err(error),
                Ok(target) => Node::List(
                    names
                        .segments()
                        .into_iter()
                        .map(|name| Node::from(validate_field_name(&target, name)))
                        .collect(),
                ),
            };
            (type_name.clone(), node)
        })
        .collect();
    match Node::Map(entries).collect() {
        Ok(collected) => Ok(collected
            .into_map()
            .into_iter()
            .map(|(type_name, names)| (type_name, names.into_values()))
            .collect()),
        Err(errors) => Err(errors
            .into_iter()
            .map(|error| error.prepend_source("fields"))
            .collect()),
    }
}

/// The type a fieldset key refers to: the queried type itself or a declared relation of it.
fn resolve_fieldset_type(
    resource_type: &ResourceType,
    type_name: &str,
) -> Result<ResourceType, Error> {
    if type_name == resource_type.name() {
        return Ok(resource_type.clone());
    }
    if resource_type
        .related_type_names()
        .any(|related| related == type_name)
    {
        let registry = resource_type.registry().ok_or_else(|| {
            Error::new(ErrorKind::NoTypeRegistry).with("resource_type", resource_type.name())
        })?;
        return Ok(registry.fetch_type(type_name)?.clone());
    }
    Err(Error::new(ErrorKind::InvalidFieldType)
        .with("key", type_name)
        .with("resource_type", resource_type.name()))
}

fn validate_field_name(resource_type: &ResourceType, name: String) -> Result<String, Error> {
    match resource_type.fetch_local_field(&name) {
        Ok(_) => Ok(name),
        Err(_) => Err(Error::new(ErrorKind::InvalidField)
            .with("key", name.as_str())
            .with("resource_type", resource_type.name())),
    }
}

fn validate_include(resource_type: &ResourceType, params: &Params) -> Result<Vec<String>, Vec<Error>> {
    let Some(include) = &params.include else {
        return Ok(Vec::new());
    };
    let node = Node::List(
        include
            .segments()
            .into_iter()
            .map(|name| Node::from(validate_include_name(resource_type, name)))
            .collect(),
    );
    match node.collect() {
        Ok(collected) => Ok(collected.into_values()),
        Err(errors) => Err(errors
            .into_iter()
            .map(|error| error.prepend_source("include"))
            .collect()),
    }
}

fn validate_include_name(resource_type: &ResourceType, name: String) -> Result<String, Error> {
    let resolved = resource_type.fetch_relationship(&name)?;
    let relationship = resolved
        .relationship()
        .expect("fetch_relationship only returns relationships");
    if relationship.is_graphable() {
        Ok(name)
    } else {
        Err(Error::new(ErrorKind::CannotIncludeRelationship)
            .with("key", name.as_str())
            .with("resource_type", resource_type.name()))
    }
}

fn validate_page(params: &Params, config: &Config) -> Result<Page, Vec<Error>> {
    let entries = params
        .page
        .iter()
        .filter(|(key, _)| key == "number" || key == "size")
        .map(|(key, raw)| {
            let result = match key.as_str() {
                "number" => cast_page_int(raw),
                _ => cast_page_int(raw).and_then(|size| check_page_size(size, raw, config)),
            };
            (key.clone(), Node::from(result))
        })
        .collect();
    match Node::Map(entries).collect() {
        Ok(collected) => {
            let mut page = Page::default();
            for (key, value) in collected.into_map() {
                match key.as_str() {
                    "number" => page.number = value.into_value().max(0) as u64,
                    _ => page.size = value.into_value(),
                }
            }
            Ok(page)
        }
        Err(errors) => Err(errors
            .into_iter()
            .map(|error| error.prepend_source("page"))
            .collect()),
    }
}

fn cast_page_int(raw: &str) -> Result<i64, Error> {
    raw.trim().parse().map_err(|_| {
        Error::new(ErrorKind::TypeCastFailure)
            .with("input", raw)
            .with("type", "integer")
    })
}

fn check_page_size(size: i64, raw: &str, config: &Config) -> Result<i64, Error> {
    match config.max_page_size {
        Some(max) if size >= 0 && size as u64 > max => {
            Err(Error::new(ErrorKind::MaxPageSizeExceeded)
                .with("input", raw)
                .with("max_allowed", max as i64))
        }
        _ => Ok(size),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::type_system::{Attribute, Registry, RegistryBuilder, Relationship, ResourceType};
    use crate::value::DataType;

    fn registry() -> Registry {
        RegistryBuilder::new()
            .register(
                ResourceType::new("artists")
                    .put_field(Attribute::new("id", DataType::Integer).queryable())
                    .put_field(Attribute::new("name", DataType::String).queryable()),
            )
            .register(
                ResourceType::new("albums")
                    .put_field(Attribute::new("id", DataType::Integer).queryable())
                    .put_field(Attribute::new("title", DataType::String).queryable())
                    .put_field(Attribute::new("releaseDate", DataType::Date).mapped_to("release_date").queryable())
                    .put_field(Relationship::to_one("artist", "artists"))
                    .put_field(Relationship::to_many("songs", "songs")),
            )
            .register(
                ResourceType::new("songs")
                    .with_max_depth(2)
                    .put_field(Attribute::new("id", DataType::Integer).queryable())
                    .put_field(Attribute::new("title", DataType::String).queryable())
                    .put_field(Relationship::to_one("album", "albums")),
            )
            .build()
    }

    #[test]
    fn test_valid_params_merge() {
        let registry = registry();
        let songs = registry.expect_type("songs");
        let params = Params::new()
            .filter("album.artist.name", "Duran Duran")
            .sort("-album.releaseDate,title")
            .fields("songs", "title")
            .fields("albums", vec!["title", "releaseDate"])
            .include("album,album.artist")
            .page("number", "2")
            .page("size", "2");

        let options = validate(songs, &params, &Config::default()).unwrap();
        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.filters[0].field().name(), "album.artist.name");
        assert_eq!(options.sorters.len(), 2);
        assert_eq!(options.fields["albums"], vec!["title", "releaseDate"]);
        assert_eq!(options.include, vec!["album", "album.artist"]);
        assert_eq!(options.page, Page::new(2, 2));
    }

    #[test]
    fn test_all_errors_are_collected_with_source_paths() {
        let registry = registry();
        let songs = registry.expect_type("songs");
        let params = Params::new()
            .filter("title eq", "Rio")
            .filter("missing eq", "x")
            .sort("-title,nope")
            .fields("videos", "title")
            .include("title")
            .page("size", "two");

        let errors = validate(songs, &params, &Config::default()).unwrap_err();
        let paths: Vec<_> = errors
            .iter()
            .map(|error| {
                (
                    error.kind(),
                    error
                        .source_path()
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                (
                    ErrorKind::AttributeNotFound,
                    vec!["filter".to_owned(), "missing eq".to_owned()]
                ),
                (
                    ErrorKind::AttributeNotFound,
                    vec!["sort".to_owned(), "1".to_owned()]
                ),
                (
                    ErrorKind::InvalidFieldType,
                    vec!["fields".to_owned(), "videos".to_owned()]
                ),
                (
                    ErrorKind::RelationshipNotFound,
                    vec!["include".to_owned(), "0".to_owned()]
                ),
                (
                    ErrorKind::TypeCastFailure,
                    vec!["page".to_owned(), "size".to_owned()]
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_field_in_a_valid_fieldset() {
        let registry = registry();
        let songs = registry.expect_type("songs");
        let params = Params::new().fields("albums", "title,missing");
        let errors = validate(songs, &params, &Config::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::InvalidField);
        assert_eq!(
            errors[0].source_path(),
            &[Value::from("fields"), Value::from("albums"), Value::Integer(1)]
        );
    }

    #[test]
    fn test_max_filters_error_leads_the_list() {
        let registry = RegistryBuilder::new()
            .register(
                ResourceType::new("songs")
                    .with_max_filters(0)
                    .put_field(Attribute::new("title", DataType::String).queryable()),
            )
            .build();
        let songs = registry.expect_type("songs");
        let params = Params::new().filter("title", "Rio");
        let errors = validate(songs, &params, &Config::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::MaxFiltersExceeded);
        assert_eq!(errors[0].source_path(), &[Value::from("filter")]);
    }

    #[test]
    fn test_include_rejects_non_graphable_relationships() {
        let registry = registry();
        let albums = registry.expect_type("albums");
        // albums.songs is to-many: present as a local field, but never graphable.
        let params = Params::new().include("songs");
        let errors = validate(albums, &params, &Config::default()).unwrap_err();
        assert_eq!(errors[0].kind(), ErrorKind::RelationshipNotFound);
    }

    #[test]
    fn test_include_on_unregistered_type_checks_graphability() {
        let videos = ResourceType::new("videos")
            .put_field(Relationship::to_many("tags", "tags"))
            .put_field(Relationship::to_one("channel", "channels"));
        let params = Params::new().include("tags,channel");
        let errors = validate(&videos, &params, &Config::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::CannotIncludeRelationship);
        assert_eq!(
            errors[0].source_path(),
            &[Value::from("include"), Value::Integer(0)]
        );
    }

    #[test]
    fn test_page_size_bound() {
        let registry = registry();
        let songs = registry.expect_type("songs");
        let params = Params::new().page("size", "500");
        let config = Config {
            max_page_size: Some(100),
        };
        let errors = validate(songs, &params, &config).unwrap_err();
        assert_eq!(errors[0].kind(), ErrorKind::MaxPageSizeExceeded);
        assert_eq!(errors[0].get("max_allowed"), Some(&Value::Integer(100)));

        let params = Params::new().page("size", "100");
        assert!(validate(songs, &params, &config).is_ok());
    }

    #[test]
    fn test_defaults_when_sections_are_absent() {
        let registry = registry();
        let songs = registry.expect_type("songs");
        let options = validate(songs, &Params::new(), &Config::default()).unwrap();
        assert!(options.filters.is_empty());
        assert!(options.sorters.is_empty());
        assert!(options.include.is_empty());
        assert_eq!(options.page, Page::default());
    }
}
