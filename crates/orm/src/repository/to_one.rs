//! To-one eager join with batched collection initialisation
//!
//! Member and delivery are joined into the root query, which keeps one row
//! per order and can therefore be paged. Line collections are then filled by
//! the batch loader in `ceil(N / B)` further queries.

use super::rows::{self, DELIVERY_FIELDS, ITEM_FIELDS, LINE_FIELDS, MEMBER_FIELDS, ORDER_FIELDS};
use super::search::OrderSearch;
use crate::error::{ModelError, OrmResult};
use crate::loading::{BatchLoader, FetchPlan};
use crate::paging::PageRequest;
use crate::query::QueryBuilder;
use crate::schema::{Order, OrderItem, ORDERS, ORDER_DELIVERY, ORDER_ITEM, ORDER_ITEM_ITEM, ORDER_MEMBER};
use crate::session::Session;

/// `orders o` with `member m` and `delivery d` joined
pub fn to_one_plan() -> OrmResult<FetchPlan> {
    FetchPlan::new(ORDERS, "o")
        .fetch(ORDER_MEMBER, "o", "m")?
        .fetch(ORDER_DELIVERY, "o", "d")
}

/// Paged root query with member and delivery columns
pub fn to_one_root_query(search: &OrderSearch, page: &PageRequest, default_limit: u64) -> OrmResult<QueryBuilder> {
    let plan = to_one_plan()?;
    plan.check_paging(page)?;
    let query = plan
        .root_query()
        .select(ORDER_FIELDS)
        .select(MEMBER_FIELDS)
        .select(DELIVERY_FIELDS);
    Ok(search
        .apply(query)
        .order_by("o.order_id")
        .paginate(page.offset(), page.limit_or(default_limit)))
}

/// Lines joined to their item; the batch loader appends `oi.order_id IN (...)`
pub fn lines_with_items_query() -> OrmResult<QueryBuilder> {
    let plan = FetchPlan::new(ORDER_ITEM, "oi").fetch(ORDER_ITEM_ITEM, "oi", "i")?;
    Ok(plan
        .root_query()
        .select(LINE_FIELDS)
        .select(ITEM_FIELDS)
        .order_by("oi.order_item_id"))
}

fn decode_line(row: &crate::backends::DatabaseRow) -> OrmResult<OrderItem> {
    rows::line_with_item(row)?.ok_or_else(|| ModelError::Query("order line row without a line id".to_string()))
}

/// Fill every order's line collection with batched `IN` queries
pub async fn initialize_order_items(session: &mut Session, loader: &BatchLoader, orders: &mut [Order]) -> OrmResult<usize> {
    let ids: Vec<i64> = orders
        .iter()
        .filter(|order| !order.order_items.is_loaded())
        .map(|order| order.id)
        .collect();

    let mut loaded = loader
        .load_grouped(session, &lines_with_items_query()?, "oi.order_id", "line_order_id", &ids, decode_line)
        .await?;

    for order in orders.iter_mut().filter(|order| !order.order_items.is_loaded()) {
        order.order_items.initialize(loaded.take(order.id));
    }
    Ok(loaded.query_count)
}

pub async fn load_with_member_and_delivery(
    session: &mut Session,
    loader: &BatchLoader,
    search: &OrderSearch,
    page: &PageRequest,
    default_limit: u64,
) -> OrmResult<Vec<Order>> {
    let query = to_one_root_query(search, page, default_limit)?;
    let found = session.fetch_all(&query).await?;
    let mut orders = found.iter().map(rows::order_with_to_one).collect::<OrmResult<Vec<_>>>()?;

    let batches = initialize_order_items(session, loader, &mut orders).await?;
    tracing::debug!(roots = orders.len(), batches, "to-one join loaded");
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_query_is_paged_and_ordered() {
        let query = to_one_root_query(&OrderSearch::new(), &PageRequest::new(1, 1), 100).unwrap();
        let sql = query.to_sql();
        assert!(sql.starts_with("SELECT o.order_id, o.member_id"));
        assert!(sql.contains("LEFT JOIN member m ON o.member_id = m.member_id"));
        assert!(sql.ends_with("ORDER BY o.order_id ASC LIMIT 1 OFFSET 1"));
    }

    #[test]
    fn test_default_page_applies_default_limit() {
        let query = to_one_root_query(&OrderSearch::new(), &PageRequest::unpaged(), 100).unwrap();
        assert_eq!(query.limit_count(), Some(100));
        assert_eq!(query.offset_value(), Some(0));
    }

    #[test]
    fn test_lines_query_joins_item() {
        let sql = lines_with_items_query().unwrap().to_sql();
        assert!(sql.contains("FROM order_item oi LEFT JOIN item i ON oi.item_id = i.item_id"));
    }
}
