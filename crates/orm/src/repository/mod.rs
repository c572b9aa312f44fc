//! Order and member query repositories
//!
//! Five ways to read the same order aggregates, from the N+1 baseline to the
//! paged two-phase projection, plus the read side of members.

pub mod dto;
pub mod fetch_join;
pub mod flat;
pub mod members;
pub mod naive;
pub mod projection;
pub(crate) mod rows;
pub mod search;
pub mod service;
pub mod to_one;

pub use dto::{regroup_flat_rows, FlatRow, OrderItemProjection, OrderProjection, SimpleOrderProjection};
pub use members::MemberQueryRepository;
pub use naive::{NaiveLoad, NaiveLoadStats, NaiveLoader};
pub use search::OrderSearch;
pub use service::OrderQueryService;
