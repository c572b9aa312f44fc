//! Naive full-graph loading
//!
//! Loads root rows, then initialises every association of every order with
//! its own query. Each initialisation is an explicit call, so the N+1 cost is
//! visible in the code that pays it.

use serde::Serialize;

use super::rows::{self, require, DELIVERY_FIELDS, ITEM_FIELDS, LINE_FIELDS, MEMBER_FIELDS, ORDER_FIELDS};
use super::search::OrderSearch;
use crate::error::OrmResult;
use crate::query::QueryBuilder;
use crate::schema::{Order, OrderItem};
use crate::session::Session;

/// Round trips of a naive load, by what triggered them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NaiveLoadStats {
    pub root_queries: usize,
    /// Member and delivery, one each per order
    pub to_one_queries: usize,
    /// One line-collection query per order
    pub collection_queries: usize,
    /// One item query per order line
    pub item_queries: usize,
}

impl NaiveLoadStats {
    /// Root, to-one and item-reference queries: `1 + N * (2 + avg_items)`
    pub fn association_access_queries(&self) -> usize {
        self.root_queries + self.to_one_queries + self.item_queries
    }

    pub fn total(&self) -> usize {
        self.association_access_queries() + self.collection_queries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaiveLoad {
    pub orders: Vec<Order>,
    pub stats: NaiveLoadStats,
}

/// Per-association loader over one session
pub struct NaiveLoader<'s> {
    session: &'s mut Session,
    stats: NaiveLoadStats,
}

impl<'s> NaiveLoader<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            session,
            stats: NaiveLoadStats::default(),
        }
    }

    pub fn stats(&self) -> NaiveLoadStats {
        self.stats
    }

    pub fn root_query(search: &OrderSearch) -> QueryBuilder {
        let mut query = QueryBuilder::new().select(ORDER_FIELDS).from_as("orders", "o");
        if search.needs_member() {
            // filter-only join; member columns are not read from it
            query = query.join_as("member", "m", "o.member_id", "m.member_id");
        }
        search.apply(query).order_by("o.order_id")
    }

    /// Root rows only, associations unloaded
    pub async fn load_roots(&mut self, search: &OrderSearch) -> OrmResult<Vec<Order>> {
        let found = self.session.fetch_all(&Self::root_query(search)).await?;
        self.stats.root_queries += 1;
        found.iter().map(rows::order_root).collect()
    }

    pub async fn initialize_member(&mut self, order: &mut Order) -> OrmResult<()> {
        if order.member.is_loaded() {
            return Ok(());
        }
        let id = order.member.id();
        let query = QueryBuilder::new()
            .select(MEMBER_FIELDS)
            .from_as("member", "m")
            .where_eq("m.member_id", id);
        let found = self.session.fetch_all(&query).await?;
        self.stats.to_one_queries += 1;

        let member = found.first().map(rows::member).transpose()?.flatten();
        order.member.resolve(require(member, "member", id)?);
        Ok(())
    }

    pub async fn initialize_delivery(&mut self, order: &mut Order) -> OrmResult<()> {
        if order.delivery.is_loaded() {
            return Ok(());
        }
        let id = order.delivery.id();
        let query = QueryBuilder::new()
            .select(DELIVERY_FIELDS)
            .from_as("delivery", "d")
            .where_eq("d.delivery_id", id);
        let found = self.session.fetch_all(&query).await?;
        self.stats.to_one_queries += 1;

        let delivery = found.first().map(rows::delivery).transpose()?.flatten();
        order.delivery.resolve(require(delivery, "delivery", id)?);
        Ok(())
    }

    /// Lines of one order, items unloaded
    pub async fn initialize_order_items(&mut self, order: &mut Order) -> OrmResult<()> {
        if order.order_items.is_loaded() {
            return Ok(());
        }
        let query = QueryBuilder::new()
            .select(LINE_FIELDS)
            .from_as("order_item", "oi")
            .where_eq("oi.order_id", order.id)
            .order_by("oi.order_item_id");
        let found = self.session.fetch_all(&query).await?;
        self.stats.collection_queries += 1;

        let lines = found
            .iter()
            .filter_map(|row| rows::line(row).transpose())
            .collect::<OrmResult<Vec<_>>>()?;
        order.order_items.initialize(lines);
        Ok(())
    }

    pub async fn initialize_item(&mut self, line: &mut OrderItem) -> OrmResult<()> {
        if line.item.is_loaded() {
            return Ok(());
        }
        let id = line.item.id();
        let query = QueryBuilder::new()
            .select(ITEM_FIELDS)
            .from_as("item", "i")
            .where_eq("i.item_id", id);
        let found = self.session.fetch_all(&query).await?;
        self.stats.item_queries += 1;

        let item = found.first().map(rows::item).transpose()?.flatten();
        line.item.resolve(require(item, "item", id)?);
        Ok(())
    }

    /// Initialise member, delivery, lines and every line's item
    pub async fn initialize_graph(&mut self, order: &mut Order) -> OrmResult<()> {
        self.initialize_member(order).await?;
        self.initialize_delivery(order).await?;
        self.initialize_order_items(order).await?;
        for line in order.order_items.get_mut()?.iter_mut() {
            self.initialize_item(line).await?;
        }
        Ok(())
    }
}

/// Roots, then one query per association per row
pub async fn load_all(session: &mut Session, search: &OrderSearch) -> OrmResult<NaiveLoad> {
    let mut loader = NaiveLoader::new(session);
    let mut orders = loader.load_roots(search).await?;
    for order in &mut orders {
        loader.initialize_graph(order).await?;
    }
    Ok(NaiveLoad {
        orders,
        stats: loader.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_totals() {
        let stats = NaiveLoadStats {
            root_queries: 1,
            to_one_queries: 4,
            collection_queries: 2,
            item_queries: 3,
        };
        assert_eq!(stats.association_access_queries(), 8);
        assert_eq!(stats.total(), 10);
    }

    #[test]
    fn test_root_query_joins_member_only_for_name_filter() {
        let plain = NaiveLoader::root_query(&OrderSearch::new()).to_sql();
        assert_eq!(
            plain,
            "SELECT o.order_id, o.member_id, o.delivery_id, o.order_date, o.status FROM orders o ORDER BY o.order_id ASC"
        );

        let filtered = NaiveLoader::root_query(&OrderSearch::new().with_member_name("userA")).to_sql();
        assert!(filtered.contains("INNER JOIN member m ON o.member_id = m.member_id"));
        assert!(filtered.contains("m.name LIKE $1"));
    }
}
