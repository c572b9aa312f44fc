//! Batched `IN` fetching
//!
//! Replaces one query per parent with one query per chunk of at most
//! `batch_size` parent identities, then groups the children by parent in a
//! single pass.

use std::collections::{HashMap, HashSet};

use crate::backends::DatabaseRow;
use crate::error::OrmResult;
use crate::query::QueryBuilder;
use crate::session::Session;

pub mod config;

pub use config::{BatchConfig, SAFE_BATCH_SIZE_RANGE};

/// Result of a batch load operation
#[derive(Debug)]
pub struct BatchLoadResult<T> {
    /// Children keyed by parent identity, in row order
    pub groups: HashMap<i64, Vec<T>>,
    /// Number of queries executed
    pub query_count: usize,
    /// Total records loaded
    pub record_count: usize,
}

impl<T> BatchLoadResult<T> {
    /// Remove and return the group for `id`; an absent group is empty
    pub fn take(&mut self, id: i64) -> Vec<T> {
        self.groups.remove(&id).unwrap_or_default()
    }
}

/// Batch loader for one-to-many associations
#[derive(Debug, Clone, Default)]
pub struct BatchLoader {
    config: BatchConfig,
}

impl BatchLoader {
    /// Create a new batch loader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new batch loader with custom configuration
    pub fn with_config(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `base` once per chunk of `parent_ids` with `key_column IN (chunk)`
    /// appended, decode every row and group by the `group_label` column.
    pub async fn load_grouped<T, F>(
        &self,
        session: &mut Session,
        base: &QueryBuilder,
        key_column: &str,
        group_label: &str,
        parent_ids: &[i64],
        decode: F,
    ) -> OrmResult<BatchLoadResult<T>>
    where
        F: Fn(&DatabaseRow) -> OrmResult<T>,
    {
        let ids = unique_ids(parent_ids);
        let mut rows = Vec::new();
        let mut query_count = 0;

        for chunk in ids.chunks(self.config.batch_size()) {
            let query = base.clone().where_in(key_column, chunk.iter().copied());
            tracing::debug!(chunk = chunk.len(), batch_size = self.config.batch_size(), "batch fetch");
            rows.extend(session.fetch_all(&query).await?);
            query_count += 1;
        }

        let record_count = rows.len();
        let groups = group_rows(&rows, group_label, decode)?;
        Ok(BatchLoadResult {
            groups,
            query_count,
            record_count,
        })
    }
}

/// Drop repeated identities, keeping first-seen order
pub fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Group rows by an integer key column in one pass, preserving row order within each group
pub fn group_rows<T, F>(rows: &[DatabaseRow], key_label: &str, decode: F) -> OrmResult<HashMap<i64, Vec<T>>>
where
    F: Fn(&DatabaseRow) -> OrmResult<T>,
{
    let mut groups: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        let key: i64 = row.get(key_label)?;
        groups.entry(key).or_default().push(decode(row)?);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests;
