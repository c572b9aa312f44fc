//! Query Builder JOIN operations

use super::builder::QueryBuilder;
use super::types::*;

impl QueryBuilder {
    fn push_join(mut self, join_type: JoinType, table: &str, alias: Option<&str>, left_col: &str, right_col: &str) -> Self {
        self.joins.push(JoinClause {
            join_type,
            table: TableRef {
                name: table.to_string(),
                alias: alias.map(str::to_string),
            },
            on_conditions: vec![(left_col.to_string(), right_col.to_string())],
        });
        self
    }

    /// Add INNER JOIN to the query
    pub fn join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Inner, table, None, left_col, right_col)
    }

    /// Add INNER JOIN with a table alias
    pub fn join_as(self, table: &str, alias: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Inner, table, Some(alias), left_col, right_col)
    }

    /// Add LEFT JOIN to the query
    pub fn left_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Left, table, None, left_col, right_col)
    }

    /// Add LEFT JOIN with a table alias
    pub fn left_join_as(self, table: &str, alias: &str, left_col: &str, right_col: &str) -> Self {
        self.push_join(JoinType::Left, table, Some(alias), left_col, right_col)
    }
}
