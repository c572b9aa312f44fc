//! Paging parameters for root queries

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, OrmResult};

/// Offset/limit as supplied by the caller. Absent values fall back to
/// offset 0 and the configured default limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// No paging supplied
    pub fn unpaged() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit_or(&self, default_limit: u64) -> u64 {
        self.limit.unwrap_or(default_limit)
    }

    /// True when the caller supplied an offset or a limit, even one equal to the default
    pub fn is_supplied(&self) -> bool {
        self.offset.is_some() || self.limit.is_some()
    }

    pub fn validate(&self) -> OrmResult<()> {
        if self.limit == Some(0) {
            return Err(ModelError::InvalidPaging("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}
