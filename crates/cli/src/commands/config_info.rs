use std::collections::BTreeMap;

use shop_core::{AppConfig, AppConfigTrait, ConfigSource};

use super::masked_url;

/// `batch_size_flag` marks the batch size as set by `--batch-size`
pub fn show(config: &AppConfig, batch_size_flag: bool) -> anyhow::Result<()> {
    let mut sources: BTreeMap<_, _> = config.config_sources().into_iter().collect();
    if batch_size_flag {
        sources.insert("batch_fetch_size".to_string(), ConfigSource::Flag("batch-size".to_string()));
    }

    println!("environment:        {}", config.environment);
    println!(
        "database:           {}",
        config.database_url.as_deref().map_or_else(|| "in-memory sample data".to_string(), masked_url)
    );
    println!("log level:          {}", config.log_level);
    println!("batch fetch size:   {}", config.batch_fetch_size);
    println!("default page limit: {}", config.default_page_limit);
    println!("max connections:    {}", config.db_max_connections);
    println!();
    println!("sources:");
    for (field, source) in sources {
        println!("  {:<20} {}", field, source);
    }
    Ok(())
}
