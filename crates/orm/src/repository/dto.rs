//! Result shapes returned to callers

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrmResult;
use crate::schema::{Address, Money, Order, OrderItem, OrderStatus};

/// An order aggregate shaped for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProjection {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    /// Shipping address of the order's delivery
    pub address: Address,
    pub order_items: Vec<OrderItemProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemProjection {
    #[serde(skip_serializing, default)]
    pub order_id: i64,
    pub item_name: String,
    pub order_price: Money,
    pub count: i32,
}

/// Order fields without the line collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleOrderProjection {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
}

/// One (order, line) pair with order fields repeated on every row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
    pub item_name: String,
    pub order_price: Money,
    pub count: i32,
}

impl OrderItem {
    pub fn to_projection(&self) -> OrmResult<OrderItemProjection> {
        Ok(OrderItemProjection {
            order_id: self.order_id,
            item_name: self.item.get()?.name.clone(),
            order_price: self.order_price,
            count: self.count,
        })
    }
}

impl Order {
    /// Fails with `NotLoaded` if any association was never initialised
    pub fn to_projection(&self) -> OrmResult<OrderProjection> {
        let order_items = self
            .order_items
            .get()?
            .iter()
            .map(OrderItem::to_projection)
            .collect::<OrmResult<Vec<_>>>()?;

        Ok(OrderProjection {
            order_id: self.id,
            member_name: self.member.get()?.name.clone(),
            order_date: self.order_date,
            status: self.status,
            address: self.delivery.get()?.address.clone(),
            order_items,
        })
    }
}

impl SimpleOrderProjection {
    pub fn with_items(self, order_items: Vec<OrderItemProjection>) -> OrderProjection {
        OrderProjection {
            order_id: self.order_id,
            member_name: self.member_name,
            order_date: self.order_date,
            status: self.status,
            address: self.address,
            order_items,
        }
    }
}

/// Regroup flat rows into aggregates, keeping the first-seen order of
/// orders and the row order of lines within each order.
pub fn regroup_flat_rows(rows: Vec<FlatRow>) -> Vec<OrderProjection> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut orders: Vec<OrderProjection> = Vec::new();

    for row in rows {
        let line = OrderItemProjection {
            order_id: row.order_id,
            item_name: row.item_name,
            order_price: row.order_price,
            count: row.count,
        };
        match positions.get(&row.order_id) {
            Some(&index) => orders[index].order_items.push(line),
            None => {
                positions.insert(row.order_id, orders.len());
                orders.push(OrderProjection {
                    order_id: row.order_id,
                    member_name: row.member_name,
                    order_date: row.order_date,
                    status: row.status,
                    address: row.address,
                    order_items: vec![line],
                });
            }
        }
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn flat(order_id: i64, item: &str) -> FlatRow {
        FlatRow {
            order_id,
            member_name: format!("member{}", order_id),
            order_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            status: OrderStatus::Ordered,
            address: Address::new("Seoul", "1", "1111"),
            item_name: item.to_string(),
            order_price: Money::new(10_000),
            count: 1,
        }
    }

    #[test]
    fn test_regroup_flat_rows() {
        let grouped = regroup_flat_rows(vec![flat(4, "A"), flat(4, "B"), flat(11, "C")]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].order_id, 4);
        let names: Vec<&str> = grouped[0].order_items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(grouped[1].order_items.len(), 1);
    }

    #[test]
    fn test_item_projection_hides_order_id() {
        let json = serde_json::to_value(OrderItemProjection {
            order_id: 4,
            item_name: "JPA1 BOOK".to_string(),
            order_price: Money::new(10_000),
            count: 1,
        })
        .unwrap();
        assert!(json.get("order_id").is_none());
        assert_eq!(json["order_price"], 10_000);
    }

    #[test]
    fn test_unloaded_order_cannot_be_projected() {
        let order = Order {
            id: 4,
            order_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            status: OrderStatus::Ordered,
            member: crate::schema::Reference::unloaded(1),
            delivery: crate::schema::Reference::unloaded(5),
            order_items: crate::schema::Collection::Loaded(Vec::new()),
        };
        assert!(matches!(
            order.to_projection(),
            Err(crate::error::ModelError::NotLoaded(_))
        ));
    }
}
