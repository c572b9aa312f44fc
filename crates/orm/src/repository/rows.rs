//! Column lists and row decoders shared by the fetch strategies.
//!
//! Every query selects the same labels for the same source, so one decoder
//! per entity serves all strategies. Joined identity columns carry their own
//! label; a NULL there means the LEFT JOIN found no row.

use crate::backends::DatabaseRow;
use crate::error::{ModelError, OrmResult};
use crate::schema::{Address, Collection, Delivery, Item, Member, Order, OrderItem, Reference};

pub(crate) const ORDER_FIELDS: &str = "o.order_id, o.member_id, o.delivery_id, o.order_date, o.status";

pub(crate) const MEMBER_FIELDS: &str = "m.member_id AS m_member_id, m.name AS member_name, \
     m.city AS member_city, m.street AS member_street, m.zipcode AS member_zipcode";

pub(crate) const DELIVERY_FIELDS: &str = "d.delivery_id AS d_delivery_id, d.city AS delivery_city, \
     d.street AS delivery_street, d.zipcode AS delivery_zipcode, d.status AS delivery_status";

pub(crate) const LINE_FIELDS: &str =
    "oi.order_item_id, oi.order_id AS line_order_id, oi.item_id, oi.order_price, oi.count";

pub(crate) const ITEM_FIELDS: &str = "i.item_id AS i_item_id, i.name AS item_name, \
     i.price AS item_price, i.stock_quantity AS item_stock_quantity";

/// Turn a missing joined row into an integrity fault
pub(crate) fn require<T>(value: Option<T>, entity: &str, id: i64) -> OrmResult<T> {
    value.ok_or_else(|| {
        tracing::error!(entity, id, "referenced row is missing");
        ModelError::not_found(entity, id)
    })
}

fn address(row: &DatabaseRow, prefix: &str) -> OrmResult<Address> {
    let field = |name: &str| -> OrmResult<String> {
        Ok(row
            .try_get::<String>(&format!("{}_{}", prefix, name))?
            .unwrap_or_default())
    };
    Ok(Address {
        city: field("city")?,
        street: field("street")?,
        zipcode: field("zipcode")?,
    })
}

/// Root columns only; every association is left unloaded
pub(crate) fn order_root(row: &DatabaseRow) -> OrmResult<Order> {
    Ok(Order {
        id: row.get("order_id")?,
        order_date: row.get("order_date")?,
        status: row.get("status")?,
        member: Reference::unloaded(row.get("member_id")?),
        delivery: Reference::unloaded(row.get("delivery_id")?),
        order_items: Collection::Unloaded,
    })
}

pub(crate) fn member(row: &DatabaseRow) -> OrmResult<Option<Member>> {
    let Some(id) = row.try_get::<i64>("m_member_id")? else {
        return Ok(None);
    };
    Ok(Some(Member {
        id,
        name: row.get("member_name")?,
        address: address(row, "member")?,
    }))
}

pub(crate) fn delivery(row: &DatabaseRow) -> OrmResult<Option<Delivery>> {
    let Some(id) = row.try_get::<i64>("d_delivery_id")? else {
        return Ok(None);
    };
    Ok(Some(Delivery {
        id,
        address: address(row, "delivery")?,
        status: row.get("delivery_status")?,
    }))
}

pub(crate) fn item(row: &DatabaseRow) -> OrmResult<Option<Item>> {
    let Some(id) = row.try_get::<i64>("i_item_id")? else {
        return Ok(None);
    };
    Ok(Some(Item {
        id,
        name: row.get("item_name")?,
        price: row.get("item_price")?,
        stock_quantity: row.get("item_stock_quantity")?,
    }))
}

/// An order line with its item unloaded; `None` when the LEFT JOIN found no line
pub(crate) fn line(row: &DatabaseRow) -> OrmResult<Option<OrderItem>> {
    let Some(id) = row.try_get::<i64>("order_item_id")? else {
        return Ok(None);
    };
    Ok(Some(OrderItem {
        id,
        order_id: row.get("line_order_id")?,
        item: Reference::unloaded(row.get("item_id")?),
        order_price: row.get("order_price")?,
        count: row.get("count")?,
    }))
}

/// An order line with its joined item resolved
pub(crate) fn line_with_item(row: &DatabaseRow) -> OrmResult<Option<OrderItem>> {
    let Some(mut line) = line(row)? else {
        return Ok(None);
    };
    let item = require(item(row)?, "item", line.item.id())?;
    line.item.resolve(item);
    Ok(Some(line))
}

/// Root plus joined member and delivery
pub(crate) fn order_with_to_one(row: &DatabaseRow) -> OrmResult<Order> {
    let mut order = order_root(row)?;
    let member = require(member(row)?, "member", order.member.id())?;
    order.member.resolve(member);
    let delivery = require(delivery(row)?, "delivery", order.delivery.id())?;
    order.delivery.resolve(delivery);
    Ok(order)
}
