//! Association metadata - cardinalities every fetch strategy must respect

use serde::{Deserialize, Serialize};

use super::tables::{Table, DELIVERY, ITEM, MEMBER, ORDERS, ORDER_ITEM};

/// Cardinality of an association from the owning entity's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Many owners reference one target (belongsTo)
    ManyToOne,
    /// One owner references exactly one target
    OneToOne,
    /// One owner has a collection of targets (hasMany)
    OneToMany,
}

impl RelationshipKind {
    /// Returns true if this relationship returns a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::OneToMany)
    }

    /// Joining a collection repeats the owner row once per child
    pub fn multiplies_rows(self) -> bool {
        self.is_collection()
    }
}

/// A navigable association between two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub name: &'static str,
    pub owner: Table,
    pub target: Table,
    pub kind: RelationshipKind,
    /// Column on the owner side of the join condition
    pub owner_column: &'static str,
    /// Column on the target side of the join condition
    pub target_column: &'static str,
}

impl Association {
    /// `(owner_alias.owner_column, target_alias.target_column)`
    pub fn join_columns(&self, owner_alias: &str, target_alias: &str) -> (String, String) {
        (
            format!("{}.{}", owner_alias, self.owner_column),
            format!("{}.{}", target_alias, self.target_column),
        )
    }
}

/// Order -> Member
pub const ORDER_MEMBER: Association = Association {
    name: "member",
    owner: ORDERS,
    target: MEMBER,
    kind: RelationshipKind::ManyToOne,
    owner_column: "member_id",
    target_column: "member_id",
};

/// Order -> Delivery
pub const ORDER_DELIVERY: Association = Association {
    name: "delivery",
    owner: ORDERS,
    target: DELIVERY,
    kind: RelationshipKind::OneToOne,
    owner_column: "delivery_id",
    target_column: "delivery_id",
};

/// Order -> OrderItem*
pub const ORDER_ITEMS: Association = Association {
    name: "order_items",
    owner: ORDERS,
    target: ORDER_ITEM,
    kind: RelationshipKind::OneToMany,
    owner_column: "order_id",
    target_column: "order_id",
};

/// OrderItem -> Item
pub const ORDER_ITEM_ITEM: Association = Association {
    name: "item",
    owner: ORDER_ITEM,
    target: ITEM,
    kind: RelationshipKind::ManyToOne,
    owner_column: "item_id",
    target_column: "item_id",
};

/// Member -> Order* (inverse side, never fetched by the order strategies)
pub const MEMBER_ORDERS: Association = Association {
    name: "orders",
    owner: MEMBER,
    target: ORDERS,
    kind: RelationshipKind::OneToMany,
    owner_column: "member_id",
    target_column: "member_id",
};
