pub mod config_info;
pub mod db;
pub mod members;
pub mod orders;

use std::sync::Arc;

use shop_core::AppConfig;
use shop_orm::backends::DatabasePoolConfig;
use shop_orm::{sample_memory_pool, DatabasePool, PostgresBackend};
use url::Url;

/// PostgreSQL when DATABASE_URL is set, otherwise the in-memory sample store
pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn DatabasePool>> {
    match &config.database_url {
        Some(url) => {
            let pool_config = DatabasePoolConfig {
                max_connections: config.db_max_connections,
                ..DatabasePoolConfig::default()
            };
            let pool = PostgresBackend::new().create_pool(url, pool_config).await?;
            tracing::info!(database = %masked_url(url), "connected");
            Ok(Arc::new(pool))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using the in-memory sample data");
            Ok(Arc::new(sample_memory_pool().await?))
        }
    }
}

/// Connection string with the password hidden
pub fn masked_url(database_url: &str) -> String {
    Url::parse(database_url)
        .map(|mut url| {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        })
        .unwrap_or_else(|_| "<invalid url>".to_string())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
