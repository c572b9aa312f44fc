//! Two-phase projection
//!
//! Phase 1 pages the to-one-joined root query straight into
//! `SimpleOrderProjection`s. Phase 2 fetches the line projections for the
//! page's order ids with `IN` queries (one per `B` ids) and attaches them by
//! lookup. A root with no group, e.g. deleted between the phases, gets an
//! empty line list.

use std::collections::HashMap;

use super::dto::{OrderItemProjection, OrderProjection, SimpleOrderProjection};
use super::rows::require;
use super::search::OrderSearch;
use super::to_one::to_one_plan;
use crate::backends::DatabaseRow;
use crate::error::OrmResult;
use crate::loading::{BatchLoader, FetchPlan};
use crate::paging::PageRequest;
use crate::query::QueryBuilder;
use crate::schema::{Address, ORDER_ITEM, ORDER_ITEM_ITEM};
use crate::session::Session;

const ROOT_PROJECTION_FIELDS: &str = "o.order_id, o.member_id, o.delivery_id, o.order_date, o.status, \
     m.member_id AS m_member_id, m.name AS member_name, \
     d.delivery_id AS d_delivery_id, d.city AS delivery_city, d.street AS delivery_street, d.zipcode AS delivery_zipcode";

const LINE_PROJECTION_FIELDS: &str = "oi.order_id AS line_order_id, oi.item_id, i.item_id AS i_item_id, \
     i.name AS item_name, oi.order_price, oi.count";

/// Phase 1: one row per order, paged
pub fn root_projection_query(search: &OrderSearch, page: &PageRequest, default_limit: u64) -> OrmResult<QueryBuilder> {
    let plan = to_one_plan()?;
    plan.check_paging(page)?;
    Ok(search
        .apply(plan.root_query().select(ROOT_PROJECTION_FIELDS))
        .order_by("o.order_id")
        .paginate(page.offset(), page.limit_or(default_limit)))
}

/// Phase 2 base query; callers add the `oi.order_id` predicate
pub fn line_projection_query() -> OrmResult<QueryBuilder> {
    Ok(FetchPlan::new(ORDER_ITEM, "oi")
        .fetch(ORDER_ITEM_ITEM, "oi", "i")?
        .root_query()
        .select(LINE_PROJECTION_FIELDS)
        .order_by("oi.order_item_id"))
}

fn simple_projection(row: &DatabaseRow) -> OrmResult<SimpleOrderProjection> {
    require(row.try_get::<i64>("m_member_id")?, "member", row.get("member_id")?)?;
    require(row.try_get::<i64>("d_delivery_id")?, "delivery", row.get("delivery_id")?)?;

    Ok(SimpleOrderProjection {
        order_id: row.get("order_id")?,
        member_name: row.get("member_name")?,
        order_date: row.get("order_date")?,
        status: row.get("status")?,
        address: Address {
            city: row.try_get::<String>("delivery_city")?.unwrap_or_default(),
            street: row.try_get::<String>("delivery_street")?.unwrap_or_default(),
            zipcode: row.try_get::<String>("delivery_zipcode")?.unwrap_or_default(),
        },
    })
}

fn line_projection(row: &DatabaseRow) -> OrmResult<OrderItemProjection> {
    require(row.try_get::<i64>("i_item_id")?, "item", row.get("item_id")?)?;
    Ok(OrderItemProjection {
        order_id: row.get("line_order_id")?,
        item_name: row.get("item_name")?,
        order_price: row.get("order_price")?,
        count: row.get("count")?,
    })
}

/// Attach each root's group by lookup; a missing group is an empty list
pub fn assemble(
    roots: Vec<SimpleOrderProjection>,
    groups: &mut HashMap<i64, Vec<OrderItemProjection>>,
) -> Vec<OrderProjection> {
    roots
        .into_iter()
        .map(|root| {
            let items = groups.remove(&root.order_id).unwrap_or_else(|| {
                tracing::debug!(order_id = root.order_id, "no lines found for order");
                Vec::new()
            });
            root.with_items(items)
        })
        .collect()
}

async fn load_roots(session: &mut Session, query: &QueryBuilder) -> OrmResult<Vec<SimpleOrderProjection>> {
    let found = session.fetch_all(query).await?;
    found.iter().map(simple_projection).collect()
}

/// To-one projection only, one paged query
pub async fn load_simple(
    session: &mut Session,
    search: &OrderSearch,
    page: &PageRequest,
    default_limit: u64,
) -> OrmResult<Vec<SimpleOrderProjection>> {
    load_roots(session, &root_projection_query(search, page, default_limit)?).await
}

/// Paged roots plus batched `IN` line queries
pub async fn load_projected(
    session: &mut Session,
    loader: &BatchLoader,
    search: &OrderSearch,
    page: &PageRequest,
    default_limit: u64,
) -> OrmResult<Vec<OrderProjection>> {
    let roots = load_roots(session, &root_projection_query(search, page, default_limit)?).await?;
    let ids: Vec<i64> = roots.iter().map(|root| root.order_id).collect();

    let mut lines = loader
        .load_grouped(session, &line_projection_query()?, "oi.order_id", "line_order_id", &ids, line_projection)
        .await?;
    tracing::debug!(roots = roots.len(), lines = lines.record_count, batches = lines.query_count, "projection assembled");

    Ok(assemble(roots, &mut lines.groups))
}

/// Paged roots, then one line query per root
pub async fn load_projected_per_root(
    session: &mut Session,
    search: &OrderSearch,
    page: &PageRequest,
    default_limit: u64,
) -> OrmResult<Vec<OrderProjection>> {
    let roots = load_roots(session, &root_projection_query(search, page, default_limit)?).await?;
    let base = line_projection_query()?;

    let mut orders = Vec::with_capacity(roots.len());
    for root in roots {
        let query = base.clone().where_eq("oi.order_id", root.order_id);
        let items = session
            .fetch_all(&query)
            .await?
            .iter()
            .map(line_projection)
            .collect::<OrmResult<Vec<_>>>()?;
        orders.push(root.with_items(items));
    }
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Money, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn root(order_id: i64) -> SimpleOrderProjection {
        SimpleOrderProjection {
            order_id,
            member_name: "userA".to_string(),
            order_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            status: OrderStatus::Ordered,
            address: Address::new("Seoul", "1", "1111"),
        }
    }

    fn line(order_id: i64, name: &str) -> OrderItemProjection {
        OrderItemProjection {
            order_id,
            item_name: name.to_string(),
            order_price: Money::new(10_000),
            count: 1,
        }
    }

    #[test]
    fn test_missing_group_is_empty() {
        let mut groups = HashMap::from([(4, vec![line(4, "A"), line(4, "B")])]);
        let assembled = assemble(vec![root(4), root(11)], &mut groups);

        assert_eq!(assembled.len(), 2);
        assert_eq!(assembled[0].order_items.len(), 2);
        assert!(assembled[1].order_items.is_empty());
    }

    #[test]
    fn test_root_query_paging() {
        let query = root_projection_query(&OrderSearch::new(), &PageRequest::new(0, 10), 100).unwrap();
        assert_eq!(query.limit_count(), Some(10));
        let defaulted = root_projection_query(&OrderSearch::new(), &PageRequest::unpaged(), 100).unwrap();
        assert_eq!(defaulted.limit_count(), Some(100));
    }

    #[test]
    fn test_line_query_shape() {
        let sql = line_projection_query().unwrap().where_in("oi.order_id", vec![4i64, 11]).to_sql();
        assert_eq!(
            sql,
            "SELECT oi.order_id AS line_order_id, oi.item_id, i.item_id AS i_item_id, i.name AS item_name, \
             oi.order_price, oi.count FROM order_item oi LEFT JOIN item i ON oi.item_id = i.item_id \
             WHERE oi.order_id IN ($1, $2) ORDER BY oi.order_item_id ASC"
        );
    }
}
