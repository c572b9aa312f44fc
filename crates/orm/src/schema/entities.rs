//! Catalog entities and the domain rules of the order aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lazy::{Collection, Reference};
use super::values::{Address, Money};
use crate::error::{ModelError, ModelResult};

/// Violations of the order aggregate's business rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("an order needs at least one order line")]
    EmptyOrder,

    #[error("order is already canceled")]
    AlreadyCanceled,

    #[error("order has already been delivered and cannot be canceled")]
    AlreadyDelivered,

    #[error("not enough stock for '{item}': requested {requested}, available {available}")]
    NotEnoughStock {
        item: String,
        requested: i32,
        available: i32,
    },

    #[error("quantity for '{item}' must be positive, got {quantity}")]
    InvalidQuantity { item: String, quantity: i32 },

    #[error("stock for '{item}' would overflow")]
    StockOverflow { item: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Ordered,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Ordered => "ORDERED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDERED" => Ok(OrderStatus::Ordered),
            "CANCELED" | "CANCELLED" => Ok(OrderStatus::Canceled),
            other => Err(ModelError::Serialization(format!("unknown order status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Ready,
    Comp,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Ready => "READY",
            DeliveryStatus::Comp => "COMP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: i64,
    pub address: Address,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub stock_quantity: i32,
}

impl Item {
    fn check_quantity(&self, quantity: i32) -> Result<(), OrderError> {
        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                item: self.name.clone(),
                quantity,
            });
        }
        Ok(())
    }

    pub fn add_stock(&mut self, quantity: i32) -> Result<(), OrderError> {
        self.check_quantity(quantity)?;
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| OrderError::StockOverflow { item: self.name.clone() })?;
        Ok(())
    }

    /// Take stock for an order line; stock never goes negative
    pub fn remove_stock(&mut self, quantity: i32) -> Result<(), OrderError> {
        self.check_quantity(quantity)?;
        let rest = self.stock_quantity - quantity;
        if rest < 0 {
            return Err(OrderError::NotEnoughStock {
                item: self.name.clone(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity = rest;
        Ok(())
    }
}

/// One line of an order. `order_price` is the unit price at purchase time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item: Reference<Item>,
    pub order_price: Money,
    pub count: i32,
}

impl OrderItem {
    /// Create a line and take its quantity out of the item's stock. The
    /// count must be positive. The owning order id is assigned by `Order::create`.
    pub fn create(id: i64, item: &mut Item, order_price: Money, count: i32) -> Result<Self, OrderError> {
        item.remove_stock(count)?;
        Ok(Self {
            id,
            order_id: 0,
            item: Reference::loaded(item.id, item.clone()),
            order_price,
            count,
        })
    }

    pub fn total_price(&self) -> Money {
        self.order_price.times(self.count)
    }
}

/// Stock to hand back to an item when an order is canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRestore {
    pub item_id: i64,
    pub quantity: i32,
}

/// Aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub member: Reference<Member>,
    pub delivery: Reference<Delivery>,
    pub order_items: Collection<OrderItem>,
}

impl Order {
    /// Place an order. Member and delivery are attached as loaded references.
    pub fn create(
        id: i64,
        member: &Member,
        mut delivery: Delivery,
        mut order_items: Vec<OrderItem>,
        order_date: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if order_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for line in &mut order_items {
            line.order_id = id;
        }
        delivery.status = DeliveryStatus::Ready;

        Ok(Self {
            id,
            order_date,
            status: OrderStatus::Ordered,
            member: Reference::loaded(member.id, member.clone()),
            delivery: Reference::loaded(delivery.id, delivery),
            order_items: Collection::Loaded(order_items),
        })
    }

    /// ORDERED -> CANCELED. Requires the delivery and lines to be loaded.
    pub fn cancel(&mut self) -> ModelResult<Vec<StockRestore>> {
        if self.delivery.get()?.status == DeliveryStatus::Comp {
            return Err(OrderError::AlreadyDelivered.into());
        }
        if self.status == OrderStatus::Canceled {
            return Err(OrderError::AlreadyCanceled.into());
        }

        let restores = self
            .order_items
            .get()?
            .iter()
            .map(|line| StockRestore {
                item_id: line.item.id(),
                quantity: line.count,
            })
            .collect();
        self.status = OrderStatus::Canceled;
        Ok(restores)
    }

    pub fn total_price(&self) -> ModelResult<Money> {
        Ok(self.order_items.get()?.iter().map(OrderItem::total_price).sum())
    }
}
