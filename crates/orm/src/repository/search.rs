use serde::{Deserialize, Serialize};

use crate::query::{contains_pattern, QueryBuilder};
use crate::schema::OrderStatus;

/// Order filter: optional status and member-name substring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSearch {
    pub status: Option<OrderStatus>,
    pub member_name: Option<String>,
}

impl OrderSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    /// The name filter, ignoring blank input
    pub fn member_name_filter(&self) -> Option<&str> {
        self.member_name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }

    /// Whether the filter needs the member table joined
    pub fn needs_member(&self) -> bool {
        self.member_name_filter().is_some()
    }

    /// Add the predicates to a query over `orders o` with `member m` joined
    pub fn apply(&self, mut query: QueryBuilder) -> QueryBuilder {
        if let Some(status) = self.status {
            query = query.where_eq("o.status", status.as_str());
        }
        if let Some(name) = self.member_name_filter() {
            query = query.where_like("m.name", &contains_pattern(name));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_ignored() {
        let search = OrderSearch::new().with_member_name("   ");
        assert!(!search.needs_member());
        assert_eq!(search.apply(QueryBuilder::new().from_as("orders", "o")).parameter_count(), 0);
    }

    #[test]
    fn test_predicates() {
        let search = OrderSearch::new()
            .with_status(OrderStatus::Ordered)
            .with_member_name("user_");
        let (sql, params) = search.apply(QueryBuilder::new().from_as("orders", "o")).to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM orders o WHERE o.status = $1 AND m.name LIKE $2");
        assert_eq!(params[1].as_str(), Some("%user\\_%"));
    }
}
