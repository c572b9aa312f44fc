use anyhow::bail;
use shop_core::AppConfig;
use shop_orm::backends::DatabasePoolConfig;
use shop_orm::schema::POSTGRES_DDL;
use shop_orm::seeding::is_safe_for_seeding;
use shop_orm::{Dataset, GeneratorConfig, PostgresBackend};

use super::masked_url;

pub fn print_schema() {
    println!("{}", POSTGRES_DDL.trim());
}

fn dataset(orders: Option<usize>, lines_per_order: usize) -> anyhow::Result<Dataset> {
    Ok(match orders {
        Some(orders) => Dataset::generate(GeneratorConfig {
            orders,
            lines_per_order,
            ..GeneratorConfig::default()
        })?,
        None => Dataset::sample()?,
    })
}

pub async fn seed(config: &AppConfig, orders: Option<usize>, lines_per_order: usize) -> anyhow::Result<()> {
    if !is_safe_for_seeding(&config.environment) {
        bail!("refusing to seed in the {} environment", config.environment);
    }
    let Some(url) = &config.database_url else {
        bail!("DATABASE_URL is not set; the in-memory store is seeded automatically");
    };

    let data = dataset(orders, lines_per_order)?;
    let pool_config = DatabasePoolConfig {
        max_connections: config.db_max_connections,
        ..DatabasePoolConfig::default()
    };
    let pool = PostgresBackend::new().create_pool(url, pool_config).await?;
    pool.ensure_schema().await?;
    let written = data.load_into(&pool).await?;

    println!(
        "Seeded {} ({} orders, {} lines, {} rows written)",
        masked_url(url),
        data.orders.len(),
        data.order_line_count(),
        written
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_choice() {
        assert_eq!(dataset(None, 3).unwrap().orders.len(), 2);
        let generated = dataset(Some(5), 2).unwrap();
        assert_eq!(generated.orders.len(), 5);
        assert_eq!(generated.order_line_count(), 10);
    }

    #[tokio::test]
    async fn test_seed_refused_in_production() {
        let config = AppConfig {
            database_url: Some("postgres://localhost/shop".to_string()),
            ..AppConfig::production()
        };
        let err = seed(&config, None, 3).await.unwrap_err();
        assert!(err.to_string().contains("refusing to seed"));
    }

    #[tokio::test]
    async fn test_seed_needs_database_url() {
        let err = seed(&AppConfig::testing(), None, 3).await.unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
