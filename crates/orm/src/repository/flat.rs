//! Flat denormalised projection: one row per (order, line), no regrouping

use super::dto::FlatRow;
use super::rows::require;
use super::search::OrderSearch;
use super::to_one::to_one_plan;
use crate::backends::DatabaseRow;
use crate::error::OrmResult;
use crate::paging::PageRequest;
use crate::query::QueryBuilder;
use crate::schema::{Address, ORDER_ITEMS, ORDER_ITEM_ITEM};
use crate::session::Session;

const FLAT_FIELDS: &str = "o.order_id, o.member_id, o.delivery_id, o.order_date, o.status, \
     m.member_id AS m_member_id, m.name AS member_name, \
     d.delivery_id AS d_delivery_id, d.city AS delivery_city, d.street AS delivery_street, d.zipcode AS delivery_zipcode, \
     oi.order_item_id, oi.item_id, oi.order_price, oi.count, \
     i.item_id AS i_item_id, i.name AS item_name";

pub fn flat_query(search: &OrderSearch, page: &PageRequest) -> OrmResult<QueryBuilder> {
    let plan = to_one_plan()?
        .fetch(ORDER_ITEMS, "o", "oi")?
        .fetch(ORDER_ITEM_ITEM, "oi", "i")?;
    plan.check_paging(page)?;

    Ok(search
        .apply(plan.root_query().select(FLAT_FIELDS))
        .order_by("o.order_id")
        .order_by("oi.order_item_id"))
}

/// `None` for an order without lines, which has no (order, line) pair
fn flat_row(row: &DatabaseRow) -> OrmResult<Option<FlatRow>> {
    let Some(_line_id) = row.try_get::<i64>("order_item_id")? else {
        tracing::debug!(order_id = ?row.try_get::<i64>("order_id"), "order without lines skipped");
        return Ok(None);
    };

    require(row.try_get::<i64>("m_member_id")?, "member", row.get("member_id")?)?;
    require(row.try_get::<i64>("d_delivery_id")?, "delivery", row.get("delivery_id")?)?;
    require(row.try_get::<i64>("i_item_id")?, "item", row.get("item_id")?)?;

    Ok(Some(FlatRow {
        order_id: row.get("order_id")?,
        member_name: row.get("member_name")?,
        order_date: row.get("order_date")?,
        status: row.get("status")?,
        address: Address {
            city: row.try_get::<String>("delivery_city")?.unwrap_or_default(),
            street: row.try_get::<String>("delivery_street")?.unwrap_or_default(),
            zipcode: row.try_get::<String>("delivery_zipcode")?.unwrap_or_default(),
        },
        item_name: row.get("item_name")?,
        order_price: row.get("order_price")?,
        count: row.get("count")?,
    }))
}

pub async fn load_flat(
    session: &mut Session,
    search: &OrderSearch,
    page: &PageRequest,
) -> OrmResult<Vec<FlatRow>> {
    let query = flat_query(search, page)?;
    let found = session.fetch_all(&query).await?;
    let flat = found
        .iter()
        .filter_map(|row| flat_row(row).transpose())
        .collect::<OrmResult<Vec<_>>>()?;
    tracing::debug!(rows = flat.len(), "flat projection loaded");
    Ok(flat)
}
