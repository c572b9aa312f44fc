//! Collection fetch join
//!
//! One query joins member, delivery, lines and items. Each order row is
//! repeated once per line, so the rows are folded back into one order per
//! identity (first-seen order) and paging is refused.

use std::collections::HashMap;

use super::rows::{self, DELIVERY_FIELDS, ITEM_FIELDS, LINE_FIELDS, MEMBER_FIELDS, ORDER_FIELDS};
use super::search::OrderSearch;
use super::to_one::to_one_plan;
use crate::backends::DatabaseRow;
use crate::error::OrmResult;
use crate::paging::PageRequest;
use crate::query::QueryBuilder;
use crate::schema::{Collection, Order, ORDER_ITEMS, ORDER_ITEM_ITEM};
use crate::session::Session;

/// The single multiplied-row query
pub fn collection_join_query(search: &OrderSearch, page: &PageRequest) -> OrmResult<QueryBuilder> {
    let plan = to_one_plan()?
        .fetch(ORDER_ITEMS, "o", "oi")?
        .fetch(ORDER_ITEM_ITEM, "oi", "i")?;
    plan.check_paging(page)?;

    let query = plan
        .root_query()
        .select(ORDER_FIELDS)
        .select(MEMBER_FIELDS)
        .select(DELIVERY_FIELDS)
        .select(LINE_FIELDS)
        .select(ITEM_FIELDS);
    Ok(search.apply(query).order_by("o.order_id").order_by("oi.order_item_id"))
}

/// Fold multiplied rows into distinct orders, keeping first-seen root order
pub fn deduplicate_roots(found: &[DatabaseRow]) -> OrmResult<Vec<Order>> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut orders: Vec<Order> = Vec::new();

    for row in found {
        let order_id: i64 = row.get("order_id")?;
        let index = match positions.get(&order_id) {
            Some(&index) => index,
            None => {
                let mut order = rows::order_with_to_one(row)?;
                order.order_items = Collection::Loaded(Vec::new());
                positions.insert(order_id, orders.len());
                orders.push(order);
                orders.len() - 1
            }
        };
        if let Some(line) = rows::line_with_item(row)? {
            orders[index].order_items.get_mut()?.push(line);
        }
    }

    Ok(orders)
}

pub async fn load_with_items(
    session: &mut Session,
    search: &OrderSearch,
    page: &PageRequest,
) -> OrmResult<Vec<Order>> {
    let query = collection_join_query(search, page)?;
    let found = session.fetch_all(&query).await?;
    let orders = deduplicate_roots(&found)?;
    tracing::debug!(rows = found.len(), roots = orders.len(), "collection fetch join deduplicated");
    Ok(orders)
}
