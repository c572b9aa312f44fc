//! Structured logging bootstrap shared by every binary in the workspace.

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, Environment};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Include file and line number information
    pub include_location: bool,
    /// Environment filter (supports directives like "shop_orm=debug,sqlx=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            include_location: false,
            env_filter: Some("shop_orm=info,shop_cli=info,sqlx=warn".to_string()),
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            include_location: true,
            env_filter: Some("shop_orm=debug,shop_cli=debug,sqlx=info".to_string()),
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            include_location: false,
            env_filter: Some("shop_orm=error".to_string()),
        }
    }

    /// Pick a preset from the application environment, keeping its log level
    pub fn for_app(config: &AppConfig) -> Self {
        let preset = match config.environment {
            Environment::Production => Self::production(),
            Environment::Testing => Self::test(),
            Environment::Development => Self::development(),
        };
        Self {
            level: config.log_level.clone(),
            ..preset
        }
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The directive string handed to `EnvFilter` when `RUST_LOG` is unset
    pub fn filter_directive(&self) -> String {
        match &self.env_filter {
            Some(filter) => format!("{},{}", self.level, filter),
            None => self.level.clone(),
        }
    }
}

/// Initialize structured logging. `RUST_LOG` takes precedence over the config.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directive()))?;

    let layer = Layer::new()
        .with_writer(io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;
    }

    tracing::info!(
        target: "shop::logging",
        "Structured logging initialized (level: {}, format: {})",
        config.level,
        if config.json_format { "JSON" } else { "text" }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_combines_level_and_filter() {
        let config = LoggingConfig::default().with_env_filter("shop_orm=trace");
        assert_eq!(config.filter_directive(), "info,shop_orm=trace");
        assert_eq!(LoggingConfig::default().filter_directive(), "info");
    }

    #[test]
    fn test_for_app_keeps_configured_level() {
        let mut app = AppConfig::production();
        app.log_level = "warn".to_string();
        let logging = LoggingConfig::for_app(&app);
        assert!(logging.json_format);
        assert_eq!(logging.level, "warn");
    }
}
