//! Retrieval surface over the fetch strategies
//!
//! Every call opens one read session, runs one strategy to completion and
//! commits; on error the session is rolled back and the error returned.

use std::sync::Arc;

use shop_core::{AppConfig, DEFAULT_PAGE_LIMIT};
use tracing::info;

use super::dto::{FlatRow, OrderProjection, SimpleOrderProjection};
use super::naive::NaiveLoad;
use super::search::OrderSearch;
use super::{fetch_join, flat, naive, projection, to_one};
use crate::backends::DatabasePool;
use crate::error::{ModelError, OrmResult};
use crate::loading::{BatchConfig, BatchLoader};
use crate::paging::PageRequest;
use crate::schema::Order;
use crate::session::Session;

#[derive(Clone)]
pub struct OrderQueryService {
    pool: Arc<dyn DatabasePool>,
    loader: BatchLoader,
    default_page_limit: u64,
}

impl OrderQueryService {
    /// The batch size must fit the backend's bind-parameter bound
    pub fn new(pool: Arc<dyn DatabasePool>, batch: BatchConfig) -> OrmResult<Self> {
        batch.check_against(pool.max_bind_parameters(), 0)?;
        Ok(Self {
            pool,
            loader: BatchLoader::with_config(batch),
            default_page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    pub fn from_app_config(pool: Arc<dyn DatabasePool>, config: &AppConfig) -> OrmResult<Self> {
        Ok(Self::new(pool, BatchConfig::from_app_config(config)?)?.with_default_page_limit(config.default_page_limit))
    }

    pub fn with_default_page_limit(mut self, limit: u64) -> Self {
        self.default_page_limit = limit;
        self
    }

    pub fn batch_config(&self) -> &BatchConfig {
        self.loader.config()
    }

    pub fn default_page_limit(&self) -> u64 {
        self.default_page_limit
    }

    async fn session(&self) -> OrmResult<Session> {
        Session::begin(self.pool.as_ref()).await
    }

    fn validate_default_limit(&self) -> OrmResult<()> {
        if self.default_page_limit == 0 {
            return Err(ModelError::Configuration("default page limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Baseline: roots, then one query per association access
    pub async fn list_orders_naive(&self, search: &OrderSearch) -> OrmResult<NaiveLoad> {
        let mut session = self.session().await?;
        let result = naive::load_all(&mut session, search).await;
        if let Ok(load) = &result {
            info!(
                strategy = "naive",
                roots = load.orders.len(),
                round_trips = session.round_trips(),
                "orders loaded"
            );
        }
        session.close(result).await
    }

    /// Member and delivery joined, lines batch-fetched; pageable
    pub async fn list_orders_to_one_join(&self, search: &OrderSearch, page: &PageRequest) -> OrmResult<Vec<Order>> {
        self.validate_default_limit()?;
        let mut session = self.session().await?;
        let result =
            to_one::load_with_member_and_delivery(&mut session, &self.loader, search, page, self.default_page_limit)
                .await;
        self.log_loaded("to_one_join", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    /// Everything fetch-joined in one query; not pageable
    pub async fn list_orders_collection_join(&self, search: &OrderSearch, page: &PageRequest) -> OrmResult<Vec<Order>> {
        let mut session = self.session().await?;
        let result = fetch_join::load_with_items(&mut session, search, page).await;
        self.log_loaded("collection_join", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    /// Paged roots plus batched line projections
    pub async fn list_orders_projected(
        &self,
        search: &OrderSearch,
        page: &PageRequest,
    ) -> OrmResult<Vec<OrderProjection>> {
        self.validate_default_limit()?;
        let mut session = self.session().await?;
        let result =
            projection::load_projected(&mut session, &self.loader, search, page, self.default_page_limit).await;
        self.log_loaded("projected", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    /// Paged roots plus one line query per root
    pub async fn list_orders_projected_per_root(
        &self,
        search: &OrderSearch,
        page: &PageRequest,
    ) -> OrmResult<Vec<OrderProjection>> {
        self.validate_default_limit()?;
        let mut session = self.session().await?;
        let result =
            projection::load_projected_per_root(&mut session, search, page, self.default_page_limit).await;
        self.log_loaded("projected_per_root", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    /// To-one fields only, one paged query
    pub async fn list_simple_orders(
        &self,
        search: &OrderSearch,
        page: &PageRequest,
    ) -> OrmResult<Vec<SimpleOrderProjection>> {
        self.validate_default_limit()?;
        let mut session = self.session().await?;
        let result = projection::load_simple(&mut session, search, page, self.default_page_limit).await;
        self.log_loaded("simple", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    /// One row per (order, line); not pageable
    pub async fn list_orders_flat(&self, search: &OrderSearch, page: &PageRequest) -> OrmResult<Vec<FlatRow>> {
        let mut session = self.session().await?;
        let result = flat::load_flat(&mut session, search, page).await;
        self.log_loaded("flat", &session, result.as_ref().map(Vec::len));
        session.close(result).await
    }

    fn log_loaded(&self, strategy: &str, session: &Session, loaded: Result<usize, &ModelError>) {
        match loaded {
            Ok(count) => info!(strategy, results = count, round_trips = session.round_trips(), "orders loaded"),
            Err(err) if err.is_integrity_fault() => {
                tracing::error!(strategy, error = %err, "integrity fault while loading orders")
            }
            Err(err) => tracing::debug!(strategy, error = %err, "order load failed"),
        }
    }
}
