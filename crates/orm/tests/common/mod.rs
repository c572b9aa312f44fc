#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use shop_orm::{
    Address, BatchConfig, Dataset, Delivery, DeliveryStatus, GeneratorConfig, Item, Member, MemoryPool, Money, Order,
    OrderItem, OrderQueryService,
};

fn member(id: i64, name: &str, city: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
        address: Address::new(city, format!("{} street", id), format!("{:05}", id)),
    }
}

fn item(id: i64, name: &str, price: i64) -> Item {
    Item {
        id,
        name: name.to_string(),
        price: Money::new(price),
        stock_quantity: 100,
    }
}

/// Order 1 with two lines for userA, order 2 with one line for userB
pub fn two_orders_three_lines() -> Dataset {
    let members = vec![member(1, "userA", "Seoul"), member(2, "userB", "Busan")];
    let mut items = vec![
        item(1, "JPA1 BOOK", 10_000),
        item(2, "JPA2 BOOK", 20_000),
        item(3, "SPRING1 BOOK", 20_000),
    ];
    let date = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

    let first_lines = vec![
        OrderItem::create(1, &mut items[0], Money::new(10_000), 1).unwrap(),
        OrderItem::create(2, &mut items[1], Money::new(20_000), 2).unwrap(),
    ];
    let second_lines = vec![OrderItem::create(3, &mut items[2], Money::new(20_000), 3).unwrap()];

    let delivery = |id: i64, m: &Member| Delivery {
        id,
        address: m.address.clone(),
        status: DeliveryStatus::Ready,
    };
    let orders = vec![
        Order::create(1, &members[0], delivery(1, &members[0]), first_lines, date).unwrap(),
        Order::create(2, &members[1], delivery(2, &members[1]), second_lines, date + Duration::minutes(1)).unwrap(),
    ];

    Dataset { members, items, orders }
}

pub async fn pool_with(data: &Dataset) -> Arc<MemoryPool> {
    let pool = MemoryPool::with_catalog_schema();
    data.load_into(&pool).await.unwrap();
    Arc::new(pool)
}

pub async fn generated_pool(orders: usize, lines_per_order: usize) -> Arc<MemoryPool> {
    let data = Dataset::generate(GeneratorConfig {
        members: 7,
        items: 11,
        orders,
        lines_per_order,
    })
    .unwrap();
    pool_with(&data).await
}

pub fn service(pool: &Arc<MemoryPool>, batch_size: usize) -> OrderQueryService {
    OrderQueryService::new(pool.clone(), BatchConfig::new(batch_size).unwrap()).unwrap()
}
