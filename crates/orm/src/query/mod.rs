//! Query Builder Module - fluent builder for the read queries the fetch strategies issue

pub mod builder;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use types::{JoinClause, JoinType, OrderDirection, QueryOperator, SelectField, TableRef, WhereCondition};
pub use where_clause::{contains_pattern, escape_like};
