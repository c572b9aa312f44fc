use crate::config::{ConfigError, ConfigSource, ConfigValidator, LogLevelValidator, RangeValidator};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Lower bound of the documented safe range for the IN-clause batch size
pub const BATCH_FETCH_SIZE_MIN: u64 = 100;
/// Upper bound of the documented safe range for the IN-clause batch size
pub const BATCH_FETCH_SIZE_MAX: u64 = 1000;
pub const DEFAULT_BATCH_FETCH_SIZE: u64 = 100;
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration for the order query layer
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    /// PostgreSQL connection string; `None` means the in-memory sample store
    pub database_url: Option<String>,
    pub log_level: String,
    /// Number of identities bound into one `IN (...)` predicate
    pub batch_fetch_size: u64,
    /// Page size used when the caller supplies no limit
    pub default_page_limit: u64,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            environment: Environment::Development,
            database_url: None,
            log_level: "info".to_string(),
            batch_fetch_size: DEFAULT_BATCH_FETCH_SIZE,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            db_max_connections: 10,
        }
    }

    /// Create configuration for development
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database_url: Some("postgres://localhost/shop_dev".to_string()),
            log_level: "debug".to_string(),
            ..Self::new()
        }
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            database_url: None,
            log_level: "warn".to_string(),
            db_max_connections: 2,
            ..Self::new()
        }
    }

    /// Create configuration for production
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database_url: None, // Must be provided via env
            log_level: "info".to_string(),
            batch_fetch_size: 500,
            db_max_connections: 20,
            ..Self::new()
        }
    }

    /// Check if a database is configured
    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: FromStr>(var: &str, field: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid_value(field, raw, expected)),
        Err(_) => Ok(None),
    }
}

fn source_of(var: &str, default: impl Into<String>) -> ConfigSource {
    ConfigSource::env_or_default(var, default)
}

impl AppConfigTrait for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(env_str) = env::var("ENVIRONMENT") {
            config.environment = env_str.parse()?;
        }

        config.database_url = env::var("DATABASE_URL").ok();

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(size) = parse_env("BATCH_FETCH_SIZE", "batch_fetch_size", "positive integer")? {
            config.batch_fetch_size = size;
        }

        if let Some(limit) = parse_env("DEFAULT_PAGE_LIMIT", "default_page_limit", "positive integer")? {
            config.default_page_limit = limit;
        }

        if let Some(max) = parse_env("DB_MAX_CONNECTIONS", "db_max_connections", "positive integer")? {
            config.db_max_connections = max;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        LogLevelValidator.validate(&self.log_level)?;

        RangeValidator::new("batch_fetch_size", BATCH_FETCH_SIZE_MIN, BATCH_FETCH_SIZE_MAX)
            .validate(&self.batch_fetch_size)?;

        if self.default_page_limit == 0 {
            return Err(ConfigError::invalid_value(
                "default_page_limit",
                "0",
                "a page limit of at least 1",
            ));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::invalid_value(
                "db_max_connections",
                "0",
                "at least one connection",
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ConfigError::invalid_value(
                    "database_url",
                    url.clone(),
                    "a postgres:// or postgresql:// URL",
                ));
            }
        }

        if self.environment.is_production() && self.database_url.is_none() {
            return Err(ConfigError::missing_required(
                "database_url",
                "DATABASE_URL environment variable is required in production",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("environment".to_string(), source_of("ENVIRONMENT", "development"));
        sources.insert("database_url".to_string(), source_of("DATABASE_URL", "in-memory store"));
        sources.insert("log_level".to_string(), source_of("LOG_LEVEL", "info"));
        sources.insert(
            "batch_fetch_size".to_string(),
            source_of("BATCH_FETCH_SIZE", DEFAULT_BATCH_FETCH_SIZE.to_string()),
        );
        sources.insert(
            "default_page_limit".to_string(),
            source_of("DEFAULT_PAGE_LIMIT", DEFAULT_PAGE_LIMIT.to_string()),
        );
        sources.insert("db_max_connections".to_string(), source_of("DB_MAX_CONNECTIONS", "10"));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "ENVIRONMENT",
            "DATABASE_URL",
            "LOG_LEVEL",
            "BATCH_FETCH_SIZE",
            "DEFAULT_PAGE_LIMIT",
            "DB_MAX_CONNECTIONS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_presets_validate() {
        assert!(AppConfig::new().validate().is_ok());
        assert!(AppConfig::development().validate().is_ok());
        assert!(AppConfig::testing().validate().is_ok());
    }

    #[test]
    fn test_production_requires_database_url() {
        let config = AppConfig::production();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { ref field, .. }) if field == "database_url"
        ));

        let mut config = AppConfig::production();
        config.database_url = Some("postgres://db/shop".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_batch_fetch_size_outside_safe_range_is_rejected() {
        let mut config = AppConfig::testing();
        config.batch_fetch_size = 10;
        assert!(config.validate().is_err());

        config.batch_fetch_size = 5000;
        assert!(config.validate().is_err());

        config.batch_fetch_size = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_postgres_url_is_rejected() {
        let mut config = AppConfig::testing();
        config.database_url = Some("mysql://localhost/shop".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        env::set_var("BATCH_FETCH_SIZE", "250");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("DEFAULT_PAGE_LIMIT", "20");

        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.batch_fetch_size, 250);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_page_limit, 20);
        assert!(!config.has_database());

        let sources = config.config_sources();
        assert!(sources["batch_fetch_size"].is_env_var());
        assert!(sources["db_max_connections"].is_default());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unparsable_batch_size() {
        clear_env();
        env::set_var("BATCH_FETCH_SIZE", "lots");
        let result = AppConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "batch_fetch_size"
        ));
        clear_env();
    }
}
