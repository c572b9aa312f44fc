//! Schema and relationship model
//!
//! Table metadata, association cardinalities, the entities of the order
//! aggregate and the placeholders that stand in for unloaded associations.

pub mod entities;
pub mod lazy;
pub mod relationships;
pub mod tables;
pub mod values;

pub use entities::{
    Delivery, DeliveryStatus, Item, Member, Order, OrderError, OrderItem, OrderStatus, StockRestore,
};
pub use lazy::{Collection, Reference};
pub use relationships::{
    Association, RelationshipKind, MEMBER_ORDERS, ORDER_DELIVERY, ORDER_ITEMS, ORDER_ITEM_ITEM, ORDER_MEMBER,
};
pub use tables::{Table, ALL_TABLES, DELIVERY, ITEM, MEMBER, ORDERS, ORDER_ITEM, POSTGRES_DDL};
pub use values::{Address, Money};
