//! Request-scoped read session
//!
//! A `Session` wraps one read-only transaction. All statements of a
//! retrieval go through it so the round-trip count and the backend's
//! bind-parameter bound are enforced in one place.

use tracing::debug;

use crate::backends::{DatabasePool, DatabaseRow, DatabaseTransaction};
use crate::error::{ModelError, OrmResult};
use crate::query::QueryBuilder;

pub struct Session {
    tx: Option<Box<dyn DatabaseTransaction>>,
    max_bind_parameters: usize,
    round_trips: usize,
}

impl Session {
    /// Open a read-only transaction on the pool
    pub async fn begin(pool: &dyn DatabasePool) -> OrmResult<Self> {
        let tx = pool.begin_read_only().await?;
        Ok(Self {
            tx: Some(tx),
            max_bind_parameters: pool.max_bind_parameters(),
            round_trips: 0,
        })
    }

    /// Execute one statement
    pub async fn fetch_all(&mut self, query: &QueryBuilder) -> OrmResult<Vec<DatabaseRow>> {
        let count = query.parameter_count();
        if count > self.max_bind_parameters {
            return Err(ModelError::ParameterLimitExceeded {
                count,
                limit: self.max_bind_parameters,
            });
        }

        let tx = self
            .tx
            .as_mut()
            .ok_or_else(|| ModelError::Query("Session already finished".to_string()))?;

        self.round_trips += 1;
        debug!(sql = %query.to_sql(), params = count, round_trip = self.round_trips, "executing statement");
        let rows = tx.fetch_all(query).await?;
        debug!(rows = rows.len(), "statement returned");
        Ok(rows)
    }

    /// Statements issued so far
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    pub fn max_bind_parameters(&self) -> usize {
        self.max_bind_parameters
    }

    /// Commit the read transaction
    pub async fn finish(mut self) -> OrmResult<()> {
        match self.tx.take() {
            Some(tx) => tx.commit().await,
            None => Ok(()),
        }
    }

    /// Roll the read transaction back
    pub async fn abort(mut self) -> OrmResult<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await,
            None => Ok(()),
        }
    }

    /// Commit on success, roll back on failure, and pass the result through
    pub async fn close<T>(self, result: OrmResult<T>) -> OrmResult<T> {
        match result {
            Ok(value) => {
                self.finish().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.abort().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed read did not complete");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{MemoryPool, TableRow};
    use crate::schema::ORDERS;

    #[tokio::test]
    async fn test_round_trips_are_counted() {
        let pool = MemoryPool::new();
        pool.create_table(&ORDERS).await;
        pool.insert_rows(&[TableRow::new("orders", vec![("order_id", 1i64.into())])])
            .await
            .unwrap();

        let mut session = Session::begin(&pool).await.unwrap();
        session.fetch_all(&QueryBuilder::new().from("orders")).await.unwrap();
        session.fetch_all(&QueryBuilder::new().from("orders")).await.unwrap();
        assert_eq!(session.round_trips(), 2);
        session.finish().await.unwrap();
        assert_eq!(pool.query_count(), 2);
    }

    #[tokio::test]
    async fn test_parameter_bound_is_enforced_before_sending() {
        let pool = MemoryPool::new().with_max_bind_parameters(3);
        pool.create_table(&ORDERS).await;

        let mut session = Session::begin(&pool).await.unwrap();
        let query = QueryBuilder::new().from("orders").where_in("order_id", 1i64..=4);
        let err = session.fetch_all(&query).await.unwrap_err();

        assert!(matches!(err, ModelError::ParameterLimitExceeded { count: 4, limit: 3 }));
        assert_eq!(session.round_trips(), 0);
        assert_eq!(pool.query_count(), 0);
    }
}
