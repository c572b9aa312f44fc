use super::*;
use crate::backends::{MemoryPool, TableRow};
use crate::error::ModelError;
use crate::schema::ORDER_ITEM;

async fn pool_with_lines(orders: i64, lines_per_order: i64) -> MemoryPool {
    let pool = MemoryPool::new();
    pool.create_table(&ORDER_ITEM).await;
    let mut rows = Vec::new();
    for order_id in 1..=orders {
        for line in 0..lines_per_order {
            rows.push(TableRow::new(
                "order_item",
                vec![
                    ("order_item_id", (order_id * 100 + line).into()),
                    ("order_id", order_id.into()),
                    ("count", 1i32.into()),
                ],
            ));
        }
    }
    pool.insert_rows(&rows).await.unwrap();
    pool
}

fn base() -> QueryBuilder {
    QueryBuilder::new()
        .select("oi.order_item_id, oi.order_id")
        .from_as("order_item", "oi")
        .order_by("oi.order_item_id")
}

fn decode_line(row: &DatabaseRow) -> OrmResult<i64> {
    row.get("order_item_id")
}

#[test]
fn test_batch_config_default() {
    let config = BatchConfig::default();
    assert_eq!(config.batch_size(), 100);
    assert!(SAFE_BATCH_SIZE_RANGE.contains(&config.batch_size()));
}

#[test]
fn test_batch_config_rejects_zero() {
    assert!(matches!(BatchConfig::new(0), Err(ModelError::Configuration(_))));
    assert_eq!(BatchConfig::new(3).unwrap().batch_size(), 3);
}

#[test]
fn test_batch_config_from_app_config() {
    let mut app = shop_core::AppConfig::testing();
    app.batch_fetch_size = 250;
    assert_eq!(BatchConfig::from_app_config(&app).unwrap().batch_size(), 250);

    app.batch_fetch_size = 0;
    assert!(matches!(BatchConfig::from_app_config(&app), Err(ModelError::Configuration(_))));
}

#[test]
fn test_chunk_count_is_ceiling() {
    let config = BatchConfig::new(100).unwrap();
    assert_eq!(config.chunk_count(0), 0);
    assert_eq!(config.chunk_count(1), 1);
    assert_eq!(config.chunk_count(100), 1);
    assert_eq!(config.chunk_count(101), 2);
    assert_eq!(config.chunk_count(1000), 10);
}

#[test]
fn test_check_against_parameter_bound() {
    let config = BatchConfig::new(1000).unwrap();
    assert!(config.check_against(65_535, 2).is_ok());
    assert!(config.check_against(1000, 1).is_err());
}

#[test]
fn test_batch_loader_creation() {
    let loader = BatchLoader::new();
    assert_eq!(loader.config().batch_size(), 100);

    let custom_loader = BatchLoader::with_config(BatchConfig::new(500).unwrap());
    assert_eq!(custom_loader.config().batch_size(), 500);
}

#[test]
fn test_unique_ids_keep_first_seen_order() {
    assert_eq!(unique_ids(&[4, 11, 4, 7, 11]), vec![4, 11, 7]);
}

#[tokio::test]
async fn test_load_grouped_chunks_by_batch_size() {
    let pool = pool_with_lines(7, 2).await;
    let loader = BatchLoader::with_config(BatchConfig::new(3).unwrap());
    let ids: Vec<i64> = (1..=7).collect();

    let mut session = Session::begin(&pool).await.unwrap();
    let mut result = loader
        .load_grouped(&mut session, &base(), "oi.order_id", "order_id", &ids, decode_line)
        .await
        .unwrap();

    assert_eq!(result.query_count, 3);
    assert_eq!(session.round_trips(), 3);
    assert_eq!(result.record_count, 14);
    assert_eq!(result.groups.len(), 7);
    assert_eq!(result.take(5), vec![500, 501]);
    assert!(result.take(5).is_empty());
}

#[tokio::test]
async fn test_load_grouped_without_ids_issues_no_query() {
    let pool = pool_with_lines(1, 1).await;
    let loader = BatchLoader::new();

    let mut session = Session::begin(&pool).await.unwrap();
    let result = loader
        .load_grouped(&mut session, &base(), "oi.order_id", "order_id", &[], decode_line)
        .await
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.query_count, 0);
    assert_eq!(pool.query_count(), 0);
}

#[tokio::test]
async fn test_chunking_stays_under_parameter_bound() {
    let pool = pool_with_lines(30, 1).await.with_max_bind_parameters(10);
    let ids: Vec<i64> = (1..=30).collect();

    let mut session = Session::begin(&pool).await.unwrap();
    let err = BatchLoader::with_config(BatchConfig::new(30).unwrap())
        .load_grouped(&mut session, &base(), "oi.order_id", "order_id", &ids, decode_line)
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::ParameterLimitExceeded { count: 30, limit: 10 }));

    let result = BatchLoader::with_config(BatchConfig::new(10).unwrap())
        .load_grouped(&mut session, &base(), "oi.order_id", "order_id", &ids, decode_line)
        .await
        .unwrap();
    assert_eq!(result.query_count, 3);
    assert_eq!(result.groups.len(), 30);
}

#[test]
fn test_group_rows_preserves_row_order() {
    let row = |id: i64, order_id: i64| {
        DatabaseRow::new(
            vec!["order_item_id".into(), "order_id".into()],
            vec![id.into(), order_id.into()],
        )
    };
    let rows = vec![row(3, 1), row(1, 2), row(2, 1)];
    let groups = group_rows(&rows, "order_id", decode_line).unwrap();
    assert_eq!(groups[&1], vec![3, 2]);
    assert_eq!(groups[&2], vec![1]);
}
