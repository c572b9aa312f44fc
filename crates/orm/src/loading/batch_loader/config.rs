use std::ops::RangeInclusive;

use shop_core::{AppConfig, BATCH_FETCH_SIZE_MAX, BATCH_FETCH_SIZE_MIN, DEFAULT_BATCH_FETCH_SIZE};

use crate::error::{ModelError, OrmResult};

/// Batch sizes inside this range balance round trips against statement size
pub const SAFE_BATCH_SIZE_RANGE: RangeInclusive<usize> =
    (BATCH_FETCH_SIZE_MIN as usize)..=(BATCH_FETCH_SIZE_MAX as usize);

/// Configuration for batch loading operations. Only `new` builds one, so
/// the size is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_FETCH_SIZE as usize,
        }
    }
}

impl BatchConfig {
    /// Any size of at least one is accepted; sizes outside the safe range are logged
    pub fn new(batch_size: usize) -> OrmResult<Self> {
        if batch_size == 0 {
            return Err(ModelError::Configuration("batch size must be at least 1".to_string()));
        }
        if !SAFE_BATCH_SIZE_RANGE.contains(&batch_size) {
            tracing::warn!(
                batch_size,
                min = BATCH_FETCH_SIZE_MIN,
                max = BATCH_FETCH_SIZE_MAX,
                "batch size outside the recommended range"
            );
        }
        Ok(Self { batch_size })
    }

    /// Maximum number of identities bound into a single `IN (...)` predicate
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn from_app_config(config: &AppConfig) -> OrmResult<Self> {
        let size = usize::try_from(config.batch_fetch_size)
            .map_err(|_| ModelError::Configuration(format!("batch size {} is too large", config.batch_fetch_size)))?;
        Self::new(size)
    }

    /// A batch must fit the backend's bind-parameter bound alongside `extra` other parameters
    pub fn check_against(&self, max_bind_parameters: usize, extra: usize) -> OrmResult<()> {
        if self.batch_size + extra > max_bind_parameters {
            return Err(ModelError::Configuration(format!(
                "batch size {} plus {} filter parameters exceeds the backend limit of {} bind parameters",
                self.batch_size, extra, max_bind_parameters
            )));
        }
        Ok(())
    }

    /// Number of `IN` queries needed for `ids` distinct identities
    pub fn chunk_count(&self, ids: usize) -> usize {
        ids.div_ceil(self.batch_size)
    }
}
