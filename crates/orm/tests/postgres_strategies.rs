//! Runs against a live PostgreSQL named by DATABASE_URL:
//! `DATABASE_URL=postgres://... cargo test -p shop-orm -- --ignored`

use std::sync::Arc;

use shop_orm::backends::DatabasePoolConfig;
use shop_orm::{
    regroup_flat_rows, BatchConfig, Dataset, GeneratorConfig, ModelError, OrderProjection, OrderQueryService,
    OrderSearch, PageRequest, PostgresBackend,
};

fn projections(orders: &[shop_orm::Order]) -> Vec<OrderProjection> {
    orders.iter().map(|order| order.to_projection().unwrap()).collect()
}

async fn postgres_service() -> Option<OrderQueryService> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PostgresBackend::new()
        .create_pool(&url, DatabasePoolConfig::default())
        .await
        .unwrap();
    pool.ensure_schema().await.unwrap();

    let data = Dataset::generate(GeneratorConfig {
        members: 7,
        items: 11,
        orders: 12,
        lines_per_order: 3,
    })
    .unwrap();
    data.load_into(&pool).await.unwrap();

    Some(OrderQueryService::new(Arc::new(pool), BatchConfig::new(5).unwrap()).unwrap())
}

#[tokio::test]
#[ignore] // Requires a PostgreSQL server at DATABASE_URL
async fn test_postgres_strategies_agree() {
    let Some(service) = postgres_service().await else {
        return;
    };
    let search = OrderSearch::new();
    let page = PageRequest::unpaged();
    let everything = PageRequest::unpaged().with_limit(10_000);

    let expected = service.list_orders_projected(&search, &everything).await.unwrap();
    assert!(expected.len() >= 12);

    let naive = service.list_orders_naive(&search).await.unwrap();
    assert_eq!(projections(&naive.orders), expected);

    let to_one = service.list_orders_to_one_join(&search, &everything).await.unwrap();
    assert_eq!(projections(&to_one), expected);

    let joined = service.list_orders_collection_join(&search, &page).await.unwrap();
    assert_eq!(projections(&joined), expected);

    let per_root = service.list_orders_projected_per_root(&search, &everything).await.unwrap();
    assert_eq!(per_root, expected);

    let flat = service.list_orders_flat(&search, &page).await.unwrap();
    assert_eq!(regroup_flat_rows(flat), expected);
}

#[tokio::test]
#[ignore] // Requires a PostgreSQL server at DATABASE_URL
async fn test_postgres_refuses_paged_collection_join() {
    let Some(service) = postgres_service().await else {
        return;
    };
    let err = service
        .list_orders_collection_join(&OrderSearch::new(), &PageRequest::new(0, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidPaging(_)));
}
