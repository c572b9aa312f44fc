mod common;

use std::sync::Arc;

use common::{generated_pool, pool_with, service, two_orders_three_lines};
use shop_orm::{
    BatchConfig, Dataset, GeneratorConfig, MemoryPool, ModelError, OrderQueryService, OrderSearch, PageRequest,
    QueryBuilder, Session,
};

#[tokio::test]
async fn test_collection_join_rejects_paging() {
    let pool = pool_with(&two_orders_three_lines()).await;
    let err = service(&pool, 100)
        .list_orders_collection_join(&OrderSearch::new(), &PageRequest::new(0, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::InvalidPaging(_)));
    assert_eq!(pool.query_count(), 0);
}

#[tokio::test]
async fn test_flat_rejects_offset() {
    let pool = pool_with(&two_orders_three_lines()).await;
    let err = service(&pool, 100)
        .list_orders_flat(&OrderSearch::new(), &PageRequest::unpaged().with_offset(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::InvalidPaging(_)));
    assert_eq!(pool.query_count(), 0);
}

#[tokio::test]
async fn test_explicit_default_paging_is_rejected_for_multiplied_rows() {
    let pool = pool_with(&two_orders_three_lines()).await;
    let service = service(&pool, 100);
    let page = PageRequest::new(0, service.default_page_limit());

    let joined = service.list_orders_collection_join(&OrderSearch::new(), &page).await;
    assert!(matches!(joined, Err(ModelError::InvalidPaging(_))));
    let flat = service.list_orders_flat(&OrderSearch::new(), &page).await;
    assert!(matches!(flat, Err(ModelError::InvalidPaging(_))));
    assert_eq!(pool.query_count(), 0);
}

#[tokio::test]
async fn test_limit_equal_to_default_is_not_silently_dropped() {
    let pool = generated_pool(150, 2).await;
    let service = service(&pool, 100);
    let page = PageRequest::new(0, 100);

    let paged = service.list_orders_to_one_join(&OrderSearch::new(), &page).await.unwrap();
    assert_eq!(paged.len(), 100);

    let joined = service.list_orders_collection_join(&OrderSearch::new(), &page).await;
    assert!(matches!(joined, Err(ModelError::InvalidPaging(_))));
    let flat = service.list_orders_flat(&OrderSearch::new(), &page).await;
    assert!(matches!(flat, Err(ModelError::InvalidPaging(_))));

    let everything = service
        .list_orders_collection_join(&OrderSearch::new(), &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(everything.len(), 150);
}

#[tokio::test]
async fn test_zero_limit_is_invalid_for_pageable_strategies() {
    let pool = pool_with(&two_orders_three_lines()).await;
    let service = service(&pool, 100);
    let page = PageRequest::new(0, 0);

    let to_one = service.list_orders_to_one_join(&OrderSearch::new(), &page).await;
    assert!(matches!(to_one, Err(ModelError::InvalidPaging(_))));
    let projected = service.list_orders_projected(&OrderSearch::new(), &page).await;
    assert!(matches!(projected, Err(ModelError::InvalidPaging(_))));
}

#[tokio::test]
async fn test_to_one_join_pages_roots() {
    let pool = generated_pool(30, 2).await;
    let orders = service(&pool, 100)
        .list_orders_to_one_join(&OrderSearch::new(), &PageRequest::new(25, 10))
        .await
        .unwrap();

    assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![26, 27, 28, 29, 30]);
    assert_eq!(pool.query_count(), 2);
}

#[tokio::test]
async fn test_default_limit_caps_unpaged_requests() {
    let pool = generated_pool(30, 1).await;
    let service = service(&pool, 100).with_default_page_limit(10);

    let simple = service
        .list_simple_orders(&OrderSearch::new(), &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(simple.len(), 10);
}

async fn bounded_pool(max_bind_parameters: usize) -> Arc<MemoryPool> {
    let data = Dataset::generate(GeneratorConfig {
        members: 3,
        items: 4,
        orders: 12,
        lines_per_order: 2,
    })
    .unwrap();
    let pool = MemoryPool::with_catalog_schema().with_max_bind_parameters(max_bind_parameters);
    data.load_into(&pool).await.unwrap();
    Arc::new(pool)
}

#[tokio::test]
async fn test_oversized_in_list_exceeds_parameter_bound() {
    let pool = bounded_pool(5).await;
    let mut session = Session::begin(pool.as_ref()).await.unwrap();
    let query = QueryBuilder::new()
        .select("oi.order_id")
        .from_as("order_item", "oi")
        .where_in("oi.order_id", 1..=6i64);

    let err = session.fetch_all(&query).await.unwrap_err();
    assert!(matches!(err, ModelError::ParameterLimitExceeded { count: 6, limit: 5 }));
    assert_eq!(session.round_trips(), 0);
    assert_eq!(pool.query_count(), 0);
    session.abort().await.unwrap();
}

#[tokio::test]
async fn test_batches_are_chunked_under_parameter_bound() {
    let pool = bounded_pool(5).await;
    let service = OrderQueryService::new(pool.clone(), BatchConfig::new(5).unwrap()).unwrap();

    let orders = service
        .list_orders_projected(&OrderSearch::new(), &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(orders.len(), 12);
    // 1 root query + ceil(12 / 5)
    assert_eq!(pool.query_count(), 4);
}

#[tokio::test]
async fn test_batch_size_above_parameter_bound_is_rejected() {
    let pool = bounded_pool(5).await;
    let result = OrderQueryService::new(pool, BatchConfig::new(10).unwrap());
    assert!(matches!(result, Err(ModelError::Configuration(_))));
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected() {
    let pool = bounded_pool(5).await;
    assert!(matches!(BatchConfig::new(0), Err(ModelError::Configuration(_))));

    let mut config = shop_core::AppConfig::testing();
    config.batch_fetch_size = 0;
    let result = OrderQueryService::from_app_config(pool.clone(), &config);
    assert!(matches!(result, Err(ModelError::Configuration(_))));
    assert_eq!(pool.query_count(), 0);
}

#[tokio::test]
async fn test_session_reads_a_snapshot() {
    let pool = pool_with(&two_orders_three_lines()).await;
    let mut session = Session::begin(pool.as_ref()).await.unwrap();
    pool.delete_where("order_item", "order_id", 1i64).await.unwrap();

    let query = QueryBuilder::new().select("oi.order_item_id").from_as("order_item", "oi");
    assert_eq!(session.fetch_all(&query).await.unwrap().len(), 3);
    session.finish().await.unwrap();

    let mut later = Session::begin(pool.as_ref()).await.unwrap();
    assert_eq!(later.fetch_all(&query).await.unwrap().len(), 1);
    later.finish().await.unwrap();
}

#[tokio::test]
async fn test_order_without_lines() {
    let pool = pool_with(&two_orders_three_lines()).await;
    pool.delete_where("order_item", "order_id", 2i64).await.unwrap();
    let service = service(&pool, 100);
    let page = PageRequest::unpaged();

    let joined = service.list_orders_collection_join(&OrderSearch::new(), &page).await.unwrap();
    assert_eq!(joined.len(), 2);
    assert!(joined[1].order_items.get().unwrap().is_empty());

    let projected = service.list_orders_projected(&OrderSearch::new(), &page).await.unwrap();
    assert!(projected[1].order_items.is_empty());

    let flat = service.list_orders_flat(&OrderSearch::new(), &page).await.unwrap();
    assert!(flat.iter().all(|row| row.order_id == 1));
}
