mod commands;

use clap::{Parser, Subcommand};
use shop_core::{init_logging, AppConfig, AppConfigTrait, LoggingConfig};
use shop_orm::OrderStatus;

use commands::*;

#[derive(Parser)]
#[command(name = "shopctl")]
#[command(about = "Read orders through each fetch strategy and compare round trips")]
struct Cli {
    /// Batch size for IN-list fetches (overrides BATCH_FETCH_SIZE)
    #[arg(long, global = true)]
    batch_size: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List orders with one fetch strategy
    Orders {
        #[arg(value_enum)]
        strategy: orders::Strategy,

        /// Only orders with this status
        #[arg(long)]
        status: Option<OrderStatus>,

        /// Only orders whose member name contains this text
        #[arg(long)]
        member: Option<String>,

        #[arg(long)]
        offset: Option<u64>,

        #[arg(long)]
        limit: Option<u64>,
    },

    /// List members, or show one
    Members {
        #[arg(long)]
        id: Option<i64>,
    },

    /// Schema and sample data
    Db {
        #[command(subcommand)]
        db_command: DbCommands,
    },

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Print the PostgreSQL schema
    Schema,

    /// Create the schema and load data into DATABASE_URL
    Seed {
        /// Generate this many orders instead of the two sample orders
        #[arg(long)]
        orders: Option<usize>,

        #[arg(long, default_value = "3")]
        lines_per_order: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(size) = cli.batch_size {
        config.batch_fetch_size = size;
        config.validate()?;
    }
    init_logging(LoggingConfig::for_app(&config))
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    match cli.command {
        Commands::Orders {
            strategy,
            status,
            member,
            offset,
            limit,
        } => {
            let filter = orders::Filter {
                status,
                member,
                offset,
                limit,
            };
            orders::list(&config, strategy, filter).await?;
        }
        Commands::Members { id } => {
            members::list(&config, id).await?;
        }
        Commands::Db { db_command } => match db_command {
            DbCommands::Schema => db::print_schema(),
            DbCommands::Seed { orders, lines_per_order } => {
                db::seed(&config, orders, lines_per_order).await?;
            }
        },
        Commands::Config => {
            config_info::show(&config, cli.batch_size.is_some())?;
        }
    }

    Ok(())
}
