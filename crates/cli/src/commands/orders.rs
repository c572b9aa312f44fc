use clap::ValueEnum;
use serde::Serialize;
use shop_core::AppConfig;
use shop_orm::{
    NaiveLoadStats, Order, OrderProjection, OrderQueryService, OrderSearch, OrderStatus, OrmResult, PageRequest,
};

use super::{connect, print_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Roots, then one query per association access; rejects paging
    Naive,
    /// Member and delivery joined, lines batch-fetched
    ToOne,
    /// Everything joined in one query; rejects paging
    CollectionJoin,
    /// Paged roots, then batched line projections
    Projected,
    /// Paged roots, then one line query per order
    ProjectedPerRoot,
    /// Order fields only
    Simple,
    /// One row per order line; rejects paging
    Flat,
}

#[derive(Debug, Default)]
pub struct Filter {
    pub status: Option<OrderStatus>,
    pub member: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Filter {
    pub fn search(&self) -> OrderSearch {
        let mut search = OrderSearch::new();
        if let Some(status) = self.status {
            search = search.with_status(status);
        }
        if let Some(member) = &self.member {
            search = search.with_member_name(member.clone());
        }
        search
    }

    pub fn page(&self) -> PageRequest {
        PageRequest {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Serialize)]
struct NaiveOutput {
    orders: Vec<OrderProjection>,
    queries: NaiveLoadStats,
}

fn project(orders: &[Order]) -> OrmResult<Vec<OrderProjection>> {
    orders.iter().map(Order::to_projection).collect()
}

/// Naive loading has no paged form, so any offset or limit is refused
pub fn check_strategy_paging(strategy: Strategy, page: &PageRequest) -> anyhow::Result<()> {
    if strategy == Strategy::Naive && page.is_supplied() {
        anyhow::bail!("naive loading reads every matching order; --offset/--limit are not supported");
    }
    Ok(())
}

pub async fn list(config: &AppConfig, strategy: Strategy, filter: Filter) -> anyhow::Result<()> {
    let search = filter.search();
    let page = filter.page();
    check_strategy_paging(strategy, &page)?;
    let pool = connect(config).await?;
    let service = OrderQueryService::from_app_config(pool, config)?;

    match strategy {
        Strategy::Naive => {
            let load = service.list_orders_naive(&search).await?;
            print_json(&NaiveOutput {
                orders: project(&load.orders)?,
                queries: load.stats,
            })
        }
        Strategy::ToOne => print_json(&project(&service.list_orders_to_one_join(&search, &page).await?)?),
        Strategy::CollectionJoin => {
            print_json(&project(&service.list_orders_collection_join(&search, &page).await?)?)
        }
        Strategy::Projected => print_json(&service.list_orders_projected(&search, &page).await?),
        Strategy::ProjectedPerRoot => {
            print_json(&service.list_orders_projected_per_root(&search, &page).await?)
        }
        Strategy::Simple => print_json(&service.list_simple_orders(&search, &page).await?),
        Strategy::Flat => print_json(&service.list_orders_flat(&search, &page).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_maps_to_search_and_page() {
        let filter = Filter {
            status: Some(OrderStatus::Ordered),
            member: Some("userA".to_string()),
            offset: Some(5),
            limit: None,
        };
        let search = filter.search();
        assert_eq!(search.status, Some(OrderStatus::Ordered));
        assert_eq!(search.member_name_filter(), Some("userA"));
        assert_eq!(filter.page(), PageRequest::unpaged().with_offset(5));
    }

    #[test]
    fn test_naive_refuses_paging() {
        let page = PageRequest::unpaged().with_limit(10);
        assert!(check_strategy_paging(Strategy::Naive, &page).is_err());
        assert!(check_strategy_paging(Strategy::Naive, &PageRequest::unpaged()).is_ok());
        assert!(check_strategy_paging(Strategy::ProjectedPerRoot, &page).is_ok());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::from_str("collection-join", true), Ok(Strategy::CollectionJoin));
        assert_eq!(Strategy::from_str("projected-per-root", true), Ok(Strategy::ProjectedPerRoot));
    }
}
