use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Inclusive range validator for numeric settings
#[derive(Debug, Clone)]
pub struct RangeValidator {
    field: &'static str,
    min: u64,
    max: u64,
}

impl RangeValidator {
    pub fn new(field: &'static str, min: u64, max: u64) -> Self {
        Self { field, min, max }
    }
}

impl ConfigValidator<u64> for RangeValidator {
    fn validate(&self, value: &u64) -> Result<(), ConfigError> {
        if *value < self.min || *value > self.max {
            return Err(ConfigError::invalid_value(
                self.field,
                value.to_string(),
                format!("a value between {} and {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Validates a log level against the levels tracing understands
#[derive(Debug, Clone, Default)]
pub struct LogLevelValidator;

impl LogLevelValidator {
    pub const LEVELS: [&'static str; 5] = ["error", "warn", "info", "debug", "trace"];
}

impl ConfigValidator<String> for LogLevelValidator {
    fn validate(&self, value: &String) -> Result<(), ConfigError> {
        if !Self::LEVELS.contains(&value.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                value.clone(),
                format!("one of: {}", Self::LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validator_bounds_are_inclusive() {
        let validator = RangeValidator::new("batch_fetch_size", 100, 1000);
        assert!(validator.validate(&100).is_ok());
        assert!(validator.validate(&1000).is_ok());
        assert!(validator.validate(&99).is_err());
        assert!(validator.validate(&1001).is_err());
    }

    #[test]
    fn test_range_validator_reports_field() {
        let validator = RangeValidator::new("batch_fetch_size", 100, 1000);
        match validator.validate(&5) {
            Err(ConfigError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "batch_fetch_size");
                assert_eq!(value, "5");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_log_level_validator() {
        let validator = LogLevelValidator;
        assert!(validator.validate(&"debug".to_string()).is_ok());
        assert!(validator.validate(&"verbose".to_string()).is_err());
    }
}
