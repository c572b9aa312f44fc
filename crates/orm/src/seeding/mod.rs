//! Sample data
//!
//! The small catalog used by the CLI and the integration tests, and a
//! deterministic generator for larger data sets. Orders are built through the
//! domain constructors so every generated order satisfies the aggregate rules.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shop_core::Environment;

use crate::backends::{DatabaseValue, MemoryPool, PostgresPool, TableRow};
use crate::error::{ModelError, OrmResult};
use crate::schema::{Address, Delivery, DeliveryStatus, Item, Member, Money, Order, OrderItem};

/// Somewhere rows can be written
#[async_trait]
pub trait SeedTarget: Send + Sync {
    async fn insert_rows(&self, rows: &[TableRow]) -> OrmResult<u64>;
}

#[async_trait]
impl SeedTarget for MemoryPool {
    async fn insert_rows(&self, rows: &[TableRow]) -> OrmResult<u64> {
        MemoryPool::insert_rows(self, rows).await
    }
}

#[async_trait]
impl SeedTarget for PostgresPool {
    async fn insert_rows(&self, rows: &[TableRow]) -> OrmResult<u64> {
        PostgresPool::insert_rows(self, rows).await
    }
}

/// Seeding writes fixed ids, so it is refused in production
pub fn is_safe_for_seeding(environment: &Environment) -> bool {
    !environment.is_production()
}

/// Shape of a generated data set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub members: usize,
    pub items: usize,
    pub orders: usize,
    pub lines_per_order: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            members: 10,
            items: 20,
            orders: 50,
            lines_per_order: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub members: Vec<Member>,
    pub items: Vec<Item>,
    pub orders: Vec<Order>,
}

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn book(id: i64, name: &str, price: i64, stock: i32) -> Item {
    Item {
        id,
        name: name.to_string(),
        price: Money::new(price),
        stock_quantity: stock,
    }
}

fn place_order(
    id: i64,
    member: &Member,
    items: &mut [Item],
    lines: &[(usize, i64, i32)],
    line_id_base: i64,
    order_date: DateTime<Utc>,
) -> OrmResult<Order> {
    let mut order_items = Vec::with_capacity(lines.len());
    for (n, &(item_index, price, count)) in lines.iter().enumerate() {
        let item = items
            .get_mut(item_index)
            .ok_or_else(|| ModelError::Configuration(format!("no item at index {}", item_index)))?;
        order_items.push(OrderItem::create(line_id_base + n as i64, item, Money::new(price), count)?);
    }
    let delivery = Delivery {
        id,
        address: member.address.clone(),
        status: DeliveryStatus::Ready,
    };
    Ok(Order::create(id, member, delivery, order_items, order_date)?)
}

impl Dataset {
    /// Two members, four books, two orders of two lines each
    pub fn sample() -> OrmResult<Self> {
        let members = vec![
            Member {
                id: 1,
                name: "userA".to_string(),
                address: Address::new("Seoul", "1", "1111"),
            },
            Member {
                id: 2,
                name: "userB".to_string(),
                address: Address::new("Busan", "2", "2222"),
            },
        ];
        let mut items = vec![
            book(1, "JPA1 BOOK", 10_000, 100),
            book(2, "JPA2 BOOK", 20_000, 100),
            book(3, "SPRING1 BOOK", 20_000, 200),
            book(4, "SPRING2 BOOK", 40_000, 300),
        ];

        let orders = vec![
            place_order(1, &members[0], &mut items, &[(0, 10_000, 1), (1, 20_000, 2)], 1, base_date())?,
            place_order(
                2,
                &members[1],
                &mut items,
                &[(2, 20_000, 3), (3, 40_000, 4)],
                3,
                base_date() + Duration::minutes(5),
            )?,
        ];

        Ok(Self { members, items, orders })
    }

    /// Deterministic data set: order `n` belongs to member `n % members`
    /// and takes consecutive items starting at `n % items`.
    pub fn generate(config: GeneratorConfig) -> OrmResult<Self> {
        if config.members == 0 || config.items == 0 || config.lines_per_order == 0 {
            return Err(ModelError::Configuration(
                "generated data needs members, items and at least one line per order".to_string(),
            ));
        }

        let members: Vec<Member> = (1..=config.members as i64)
            .map(|id| Member {
                id,
                name: format!("member{:04}", id),
                address: Address::new(format!("city{}", id % 7), format!("{} main st", id), format!("{:05}", id)),
            })
            .collect();

        let stock = i32::try_from(config.orders * config.lines_per_order + 1).unwrap_or(i32::MAX);
        let mut items: Vec<Item> = (1..=config.items as i64)
            .map(|id| book(id, &format!("BOOK{:04}", id), 1_000 * id, stock))
            .collect();

        let mut orders = Vec::with_capacity(config.orders);
        for n in 0..config.orders {
            let id = n as i64 + 1;
            let lines: Vec<(usize, i64, i32)> = (0..config.lines_per_order)
                .map(|l| {
                    let index = (n + l) % config.items;
                    (index, items[index].price.amount(), (l % 3) as i32 + 1)
                })
                .collect();
            let order = place_order(
                id,
                &members[n % config.members],
                &mut items,
                &lines,
                id * 1_000,
                base_date() + Duration::minutes(id),
            )?;
            orders.push(order);
        }

        Ok(Self { members, items, orders })
    }

    pub fn order_line_count(&self) -> usize {
        self.orders
            .iter()
            .map(|order| order.order_items.get().map_or(0, |lines| lines.len()))
            .sum()
    }

    /// Rows in foreign-key order: members, items, deliveries, orders, lines
    pub fn table_rows(&self) -> OrmResult<Vec<TableRow>> {
        let mut rows = Vec::new();

        for member in &self.members {
            rows.push(TableRow::new(
                "member",
                vec![
                    ("member_id", member.id.into()),
                    ("name", member.name.clone().into()),
                    ("city", member.address.city.clone().into()),
                    ("street", member.address.street.clone().into()),
                    ("zipcode", member.address.zipcode.clone().into()),
                ],
            ));
        }

        for item in &self.items {
            rows.push(TableRow::new(
                "item",
                vec![
                    ("item_id", item.id.into()),
                    ("name", item.name.clone().into()),
                    ("price", item.price.amount().into()),
                    ("stock_quantity", item.stock_quantity.into()),
                ],
            ));
        }

        for order in &self.orders {
            let delivery = order.delivery.get()?;
            rows.push(TableRow::new(
                "delivery",
                vec![
                    ("delivery_id", delivery.id.into()),
                    ("city", delivery.address.city.clone().into()),
                    ("street", delivery.address.street.clone().into()),
                    ("zipcode", delivery.address.zipcode.clone().into()),
                    ("status", delivery.status.as_str().into()),
                ],
            ));
        }

        for order in &self.orders {
            rows.push(TableRow::new(
                "orders",
                vec![
                    ("order_id", order.id.into()),
                    ("member_id", order.member.id().into()),
                    ("delivery_id", order.delivery.id().into()),
                    ("order_date", DatabaseValue::DateTime(order.order_date)),
                    ("status", order.status.as_str().into()),
                ],
            ));
        }

        for order in &self.orders {
            for line in order.order_items.get()? {
                rows.push(TableRow::new(
                    "order_item",
                    vec![
                        ("order_item_id", line.id.into()),
                        ("order_id", line.order_id.into()),
                        ("item_id", line.item.id().into()),
                        ("order_price", line.order_price.amount().into()),
                        ("count", line.count.into()),
                    ],
                ));
            }
        }

        Ok(rows)
    }

    /// Write the data set; returns the number of rows written
    pub async fn load_into(&self, target: &dyn SeedTarget) -> OrmResult<u64> {
        let rows = self.table_rows()?;
        let written = target.insert_rows(&rows).await?;
        tracing::info!(
            members = self.members.len(),
            items = self.items.len(),
            orders = self.orders.len(),
            rows = written,
            "data set loaded"
        );
        Ok(written)
    }
}

/// An in-memory store with the catalog schema and the sample data loaded
pub async fn sample_memory_pool() -> OrmResult<MemoryPool> {
    let pool = MemoryPool::with_catalog_schema();
    Dataset::sample()?.load_into(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_takes_stock() {
        let data = Dataset::sample().unwrap();
        assert_eq!(data.members.len(), 2);
        assert_eq!(data.orders.len(), 2);
        assert_eq!(data.order_line_count(), 4);
        let stock: Vec<i32> = data.items.iter().map(|i| i.stock_quantity).collect();
        assert_eq!(stock, vec![99, 98, 197, 296]);
    }

    #[test]
    fn test_table_rows_in_dependency_order() {
        let rows = Dataset::sample().unwrap().table_rows().unwrap();
        let tables: Vec<&str> = rows.iter().map(|r| r.table).collect();
        assert_eq!(tables.len(), 2 + 4 + 2 + 2 + 4);
        assert_eq!(tables.first(), Some(&"member"));
        assert_eq!(tables.last(), Some(&"order_item"));
    }

    #[test]
    fn test_generator_is_deterministic() {
        let config = GeneratorConfig {
            members: 3,
            items: 5,
            orders: 12,
            lines_per_order: 4,
        };
        let first = Dataset::generate(config).unwrap();
        let second = Dataset::generate(config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.order_line_count(), 48);
        assert!(first.items.iter().all(|item| item.stock_quantity >= 0));
    }

    #[test]
    fn test_generator_rejects_empty_shapes() {
        let config = GeneratorConfig {
            lines_per_order: 0,
            ..GeneratorConfig::default()
        };
        assert!(Dataset::generate(config).is_err());
    }

    #[test]
    fn test_seeding_refused_in_production() {
        assert!(is_safe_for_seeding(&Environment::Development));
        assert!(!is_safe_for_seeding(&Environment::Production));
    }

    #[tokio::test]
    async fn test_sample_memory_pool() {
        let pool = sample_memory_pool().await.unwrap();
        assert_eq!(pool.query_count(), 0);
    }
}
