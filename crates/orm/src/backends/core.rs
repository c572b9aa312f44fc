//! Core Database Backend Traits
//!
//! These traits hide the concrete store behind a read-transaction interface
//! that accepts structured queries. The PostgreSQL backend renders them to
//! SQL; the in-memory backend evaluates them directly.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::backends::DatabaseBackendType;
use crate::error::{ModelError, OrmResult};
use crate::query::QueryBuilder;

/// Abstract database connection pool trait
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// Begin a read-only transaction scoped to one request
    async fn begin_read_only(&self) -> OrmResult<Box<dyn DatabaseTransaction>>;

    /// Which backend implementation this is
    fn backend_type(&self) -> DatabaseBackendType;

    /// Largest number of bind parameters a single statement may carry
    fn max_bind_parameters(&self) -> usize;

    /// Perform a health check on the pool
    async fn health_check(&self) -> OrmResult<Duration>;

    /// Close the pool
    async fn close(&self) -> OrmResult<()>;
}

/// Abstract database transaction trait
#[async_trait]
pub trait DatabaseTransaction: Send {
    /// Execute a query and return the result rows within the transaction
    async fn fetch_all(&mut self, query: &QueryBuilder) -> OrmResult<Vec<DatabaseRow>>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> OrmResult<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> OrmResult<()>;
}

/// Database pool configuration
#[derive(Debug, Clone)]
pub struct DatabasePoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: Option<u64>,
    pub max_lifetime_seconds: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for DatabasePoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    DateTime(chrono::DateTime<chrono::Utc>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Integer view of the value, if it is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int32(i) => Some(*i as i64),
            DatabaseValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// String view of the value, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

    /// SQL-style comparison. `NULL` compares to nothing, so joins and
    /// filters against it never match.
    pub fn compare(&self, other: &DatabaseValue) -> Option<Ordering> {
        use DatabaseValue::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            (Float64(a), Float64(b)) => a.partial_cmp(b),
            (Float64(a), b) => b.as_i64().and_then(|b| a.partial_cmp(&(b as f64))),
            (a, Float64(b)) => a.as_i64().and_then(|a| (a as f64).partial_cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }

    /// SQL equality (`NULL = x` is never true)
    pub fn sql_eq(&self, other: &DatabaseValue) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// One result row: column labels paired with values, in select order
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRow {
    columns: Vec<String>,
    values: Vec<DatabaseValue>,
}

impl DatabaseRow {
    pub fn new(columns: Vec<String>, values: Vec<DatabaseValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Get a column value by index
    pub fn get_by_index(&self, index: usize) -> OrmResult<&DatabaseValue> {
        self.values
            .get(index)
            .ok_or_else(|| ModelError::Query(format!("Column index {} out of range", index)))
    }

    /// Get a column value by name
    pub fn get_by_name(&self, name: &str) -> OrmResult<&DatabaseValue> {
        let index = self
            .columns
            .iter()
            .position(|col| col == name)
            .ok_or_else(|| ModelError::Query(format!("Column '{}' not found", name)))?;
        self.get_by_index(index)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Convert row to JSON object
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(col, val)| (col.clone(), val.to_json()))
            .collect();
        JsonValue::Object(map)
    }

    /// Get a typed value from a column
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> OrmResult<T> {
        let value = self.get_by_name(column)?;
        serde_json::from_value(value.to_json()).map_err(|e| {
            ModelError::Serialization(format!("Failed to deserialize column '{}': {}", column, e))
        })
    }

    /// Get an optional typed value; SQL `NULL` maps to `None`
    pub fn try_get<T: DeserializeOwned>(&self, column: &str) -> OrmResult<Option<T>> {
        let value = self.get_by_name(column)?;
        if value.is_null() {
            return Ok(None);
        }
        self.get(column).map(Some)
    }
}

/// One row to be written into a table, used for loading data sets
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub values: Vec<DatabaseValue>,
}

impl TableRow {
    pub fn new(table: &'static str, pairs: Vec<(&'static str, DatabaseValue)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Self { table, columns, values }
    }
}
