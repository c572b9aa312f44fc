//! Loading strategies support: fetch plans and batched collection loading

pub mod batch_loader;
pub mod fetch_plan;

pub use batch_loader::{group_rows, unique_ids, BatchConfig, BatchLoadResult, BatchLoader, SAFE_BATCH_SIZE_RANGE};
pub use fetch_plan::{FetchJoin, FetchPlan};
