//! Common items that you will always want in scope when using resource queries.

pub use crate::collection::{self, memory::Records, sql::SelectQuery, Countable, Delegate, Query};
pub use crate::error::{Error, ErrorKind};
pub use crate::params::{self, Config, ListInput, Options, Params};
pub use crate::query::{
    Direction, Filter, FilterInput, Operator, Page, PageInfo, Sorter, SorterInput,
};
pub use crate::type_system::{
    Attribute, Cardinality, Field, GraphedField, Registry, RegistryBuilder, Relationship,
    ResolvedField, ResourceType,
};
pub use crate::value::{DataType, Record, Value};
