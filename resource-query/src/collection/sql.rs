//! The SQL statement-building reference backend.
//!
//! This backend finishes a query as a rendered, parameterized SQL `SELECT` rather than a result
//! set: the host application executes the [`Statement`] through whatever database layer it
//! already has. Filters become `WHERE` conditions, sorters become `ORDER BY` terms, and
//! pagination becomes `LIMIT`/`OFFSET`, with values carried as `$n` parameters, never
//! interpolated into the SQL text.
//!
//! A graphed field renders through its `query_alias` — the qualified name of the relationship
//! chain it sits behind — as an alias-qualified column. Establishing the joins that give those
//! aliases meaning is the host's concern; this builder treats the alias as opaque, per the
//! backend contract. External field names convert to snake_case column names.

use super::Delegate;
use crate::query::{Filter, Operator, Page, Sorter};
use crate::type_system::{ResolvedField, ResourceType};
use crate::value::Value;
use std::fmt::{self, Display, Formatter};

/// An identifier of a column, optionally qualified by a join alias.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column {
    alias: Option<String>,
    name: String,
}

impl Column {
    /// A bare column on the queried table.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
        }
    }

    /// A column qualified by a join alias.
    pub fn qualified(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            name: name.into(),
        }
    }

    /// Escape this column for interpolation into a SQL statement.
    pub fn escape(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{}.{}", escape_ident(alias), escape_ident(&self.name)),
            None => escape_ident(&self.name),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{alias}.")?;
        }
        write!(f, "{}", self.name)
    }
}

/// One `WHERE` condition.
#[derive(Clone, Debug, PartialEq)]
enum Condition {
    /// A comparison of a column against one parameter.
    Cmp {
        column: Column,
        op: &'static str,
        param: Value,
    },
    /// A (possibly negated) `IN` over a list of parameters.
    OneOf {
        column: Column,
        params: Vec<Value>,
        negated: bool,
    },
    /// A `LIKE` prefix match.
    Like { column: Column, pattern: String },
}

impl Condition {
    /// Render this condition, pushing its parameters and numbering placeholders after them.
    fn render(&self, params: &mut Vec<Value>) -> String {
        match self {
            Self::Cmp { column, op, param } => {
                params.push(param.clone());
                format!("{} {op} ${}", column.escape(), params.len())
            }
            Self::OneOf {
                column,
                params: values,
                negated,
            } => {
                let placeholders = values
                    .iter()
                    .map(|value| {
                        params.push(value.clone());
                        format!("${}", params.len())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!("{} {keyword} ({placeholders})", column.escape())
            }
            Self::Like { column, pattern } => {
                params.push(Value::String(pattern.clone()));
                format!("{} LIKE ${}", column.escape(), params.len())
            }
        }
    }
}

/// One `ORDER BY` term.
#[derive(Clone, Debug, PartialEq, Eq)]
struct OrderBy {
    column: Column,
    descending: bool,
}

impl OrderBy {
    fn render(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {direction}", self.column.escape())
    }
}

/// A rendered, parameterized SQL statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// A `SELECT` under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectQuery {
    table: String,
    conditions: Vec<Condition>,
    orders: Vec<OrderBy>,
    page: Option<Page>,
}

impl SelectQuery {
    /// Start a `SELECT * FROM table` query.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
            orders: Vec::new(),
            page: None,
        }
    }

    /// Start a query against the table backing a resource type.
    pub fn for_type(resource_type: &ResourceType) -> Self {
        Self::new(to_snake_case(resource_type.name()))
    }

    /// Render the finished query.
    pub fn render(&self) -> Statement {
        let mut params = Vec::new();
        let mut sql = format!("SELECT * FROM {}", escape_ident(&self.table));
        self.render_where(&mut sql, &mut params);
        if !self.orders.is_empty() {
            let terms = self
                .orders
                .iter()
                .map(OrderBy::render)
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {terms}"));
        }
        if let Some(limit) = self.page.as_ref().and_then(Page::limit) {
            sql.push_str(&format!(" LIMIT {limit}"));
            let offset = self.page.as_ref().map_or(0, Page::offset);
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
        Statement { sql, params }
    }

    /// Render a count of the rows the current conditions match, ignoring order and pagination.
    pub fn count(&self) -> Statement {
        let mut params = Vec::new();
        let mut sql = format!("SELECT count(*) FROM {}", escape_ident(&self.table));
        self.render_where(&mut sql, &mut params);
        Statement { sql, params }
    }

    fn render_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.conditions.is_empty() {
            return;
        }
        let conditions = self
            .conditions
            .iter()
            .map(|condition| condition.render(params))
            .collect::<Vec<_>>()
            .join(" AND ");
        sql.push_str(&format!(" WHERE {conditions}"));
    }
}

impl Delegate for SelectQuery {
    type Output = Statement;

    fn filter(mut self, filters: &[Filter]) -> Self {
        for filter in filters {
            let column = field_column(filter.field());
            let condition = match filter.operator() {
                Operator::Eq => cmp(column, "=", filter.value()),
                Operator::Not => cmp(column, "<>", filter.value()),
                Operator::Gt => cmp(column, ">", filter.value()),
                Operator::Gte => cmp(column, ">=", filter.value()),
                Operator::Lt => cmp(column, "<", filter.value()),
                Operator::Lte => cmp(column, "<=", filter.value()),
                Operator::StartsWith => Condition::Like {
                    column,
                    pattern: format!("{}%", filter.value()),
                },
                Operator::Include => one_of(column, filter.value(), false),
                Operator::Exclude => one_of(column, filter.value(), true),
            };
            self.conditions.push(condition);
        }
        self
    }

    fn sort(mut self, sorters: &[Sorter]) -> Self {
        for sorter in sorters {
            self.orders.push(OrderBy {
                column: field_column(sorter.field()),
                descending: sorter.direction().is_descending(),
            });
        }
        self
    }

    fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    fn all(self) -> Statement {
        self.render()
    }
}

/// Translate a resolved field into the column shape this backend needs.
fn field_column(field: &ResolvedField) -> Column {
    let name = to_snake_case(field.field().map_to());
    match field.query_alias() {
        Some(alias) => Column::qualified(alias, name),
        None => Column::named(name),
    }
}

fn cmp(column: Column, op: &'static str, param: &Value) -> Condition {
    Condition::Cmp {
        column,
        op,
        param: param.clone(),
    }
}

fn one_of(column: Column, values: &Value, negated: bool) -> Condition {
    let params = match values {
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    };
    Condition::OneOf {
        column,
        params,
        negated,
    }
}

/// Escape an identifier (table name, column name, alias) for inclusion in a SQL statement.
pub fn escape_ident(s: impl AsRef<str>) -> String {
    format!("\"{}\"", s.as_ref().replace('"', "\"\""))
}

/// Convert a string to snake case.
fn to_snake_case(s: &str) -> String {
    use convert_case::Boundary::*;
    use convert_case::{Case, Casing};
    s.with_boundaries(&[Hyphen, Underscore, Space, LowerUpper])
        .to_case(Case::Snake)
}
