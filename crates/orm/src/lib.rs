//! # shop-orm: order catalog data access
//!
//! Reads order aggregates (order, member, delivery, lines, items) without
//! N+1 round trips. The same question can be answered by several fetch
//! strategies with different round-trip counts and paging support:
//!
//! - naive lazy loading, the baseline that issues one query per association access
//! - to-one fetch join plus batched `IN` collection loading, pageable
//! - collection fetch join with root dedup, not pageable
//! - two-phase projection into response shapes, pageable
//! - flat projection with one row per order line, regrouped by the caller
//!
//! Queries run against a [`DatabasePool`]: PostgreSQL through sqlx, or the
//! in-memory store that logs every statement so round trips can be counted.

pub mod backends;
pub mod error;
pub mod loading;
pub mod paging;
pub mod query;
pub mod repository;
pub mod schema;
pub mod seeding;
pub mod session;

pub use backends::{
    DatabaseBackendType, DatabasePool, DatabaseRow, DatabaseTransaction, DatabaseValue, MemoryPool, PostgresBackend,
    PostgresPool, TableRow,
};
pub use error::{ModelError, ModelResult, OrmError, OrmResult};
pub use loading::{BatchConfig, BatchLoader, FetchPlan};
pub use paging::PageRequest;
pub use query::QueryBuilder;
pub use repository::{
    regroup_flat_rows, FlatRow, MemberQueryRepository, NaiveLoad, NaiveLoadStats, OrderItemProjection,
    OrderProjection, OrderQueryService, OrderSearch, SimpleOrderProjection,
};
pub use schema::{Address, Delivery, DeliveryStatus, Item, Member, Money, Order, OrderError, OrderItem, OrderStatus};
pub use seeding::{sample_memory_pool, Dataset, GeneratorConfig, SeedTarget};
pub use session::Session;
