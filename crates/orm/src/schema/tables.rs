//! Static table metadata for the order catalog

/// A persisted table and its columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [&'static str],
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    /// `alias.column` for every column, in declaration order
    pub fn qualified_columns(&self, alias: &str) -> Vec<String> {
        self.columns.iter().map(|c| format!("{}.{}", alias, c)).collect()
    }
}

pub const MEMBER: Table = Table {
    name: "member",
    primary_key: "member_id",
    columns: &["member_id", "name", "city", "street", "zipcode"],
};

pub const ORDERS: Table = Table {
    name: "orders",
    primary_key: "order_id",
    columns: &["order_id", "member_id", "delivery_id", "order_date", "status"],
};

pub const DELIVERY: Table = Table {
    name: "delivery",
    primary_key: "delivery_id",
    columns: &["delivery_id", "city", "street", "zipcode", "status"],
};

pub const ITEM: Table = Table {
    name: "item",
    primary_key: "item_id",
    columns: &["item_id", "name", "price", "stock_quantity"],
};

pub const ORDER_ITEM: Table = Table {
    name: "order_item",
    primary_key: "order_item_id",
    columns: &["order_item_id", "order_id", "item_id", "order_price", "count"],
};

pub const ALL_TABLES: [Table; 5] = [MEMBER, ORDERS, DELIVERY, ITEM, ORDER_ITEM];

/// PostgreSQL DDL for the five tables
pub const POSTGRES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS member (
    member_id BIGINT PRIMARY KEY,
    name      VARCHAR(255) NOT NULL,
    city      VARCHAR(255),
    street    VARCHAR(255),
    zipcode   VARCHAR(32)
);

CREATE TABLE IF NOT EXISTS delivery (
    delivery_id BIGINT PRIMARY KEY,
    city        VARCHAR(255),
    street      VARCHAR(255),
    zipcode     VARCHAR(32),
    status      VARCHAR(16) NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    order_id    BIGINT PRIMARY KEY,
    member_id   BIGINT NOT NULL REFERENCES member (member_id),
    delivery_id BIGINT NOT NULL UNIQUE REFERENCES delivery (delivery_id),
    order_date  TIMESTAMPTZ NOT NULL,
    status      VARCHAR(16) NOT NULL CHECK (status IN ('ORDERED', 'CANCELED'))
);

CREATE TABLE IF NOT EXISTS item (
    item_id        BIGINT PRIMARY KEY,
    name           VARCHAR(255) NOT NULL,
    price          BIGINT NOT NULL,
    stock_quantity INTEGER NOT NULL CHECK (stock_quantity >= 0)
);

CREATE TABLE IF NOT EXISTS order_item (
    order_item_id BIGINT PRIMARY KEY,
    order_id      BIGINT NOT NULL REFERENCES orders (order_id) ON DELETE CASCADE,
    item_id       BIGINT NOT NULL REFERENCES item (item_id),
    order_price   BIGINT NOT NULL,
    count         INTEGER NOT NULL CHECK (count > 0)
);

CREATE INDEX IF NOT EXISTS idx_order_item_order_id ON order_item (order_id);
"#;
