//! Query Builder SELECT operations

use super::builder::QueryBuilder;
use super::types::{SelectField, TableRef};

impl QueryBuilder {
    /// Add SELECT fields to the query (comma separated, `AS` aliases allowed)
    pub fn select(mut self, fields: &str) -> Self {
        self.select_fields.extend(
            fields
                .split(',')
                .filter(|f| !f.trim().is_empty())
                .map(SelectField::parse),
        );
        self
    }

    /// Add SELECT DISTINCT to the query
    pub fn select_distinct(mut self, fields: &str) -> Self {
        self.distinct = true;
        self.select(fields)
    }

    /// Set the FROM table
    pub fn from(mut self, table: &str) -> Self {
        self.from_table = Some(TableRef {
            name: table.to_string(),
            alias: None,
        });
        self
    }

    /// Set the FROM table with an alias
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        self.from_table = Some(TableRef {
            name: table.to_string(),
            alias: Some(alias.to_string()),
        });
        self
    }
}
