//! Query Builder pagination operations

use super::builder::QueryBuilder;

impl QueryBuilder {
    /// Add LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, count: u64) -> Self {
        self.offset_value = Some(count);
        self
    }

    /// Add pagination (LIMIT + OFFSET)
    pub fn paginate(mut self, offset: u64, limit: u64) -> Self {
        self.offset_value = Some(offset);
        self.limit_count = Some(limit);
        self
    }

    /// True when LIMIT or OFFSET is set
    pub fn is_paged(&self) -> bool {
        self.limit_count.is_some() || self.offset_value.is_some()
    }
}
