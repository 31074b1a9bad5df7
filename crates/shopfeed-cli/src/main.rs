mod feed;
mod settings;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use settings::SettingsCommands;
use shopfeed_server::pipeline::FeedPipeline;

#[derive(Debug, Parser)]
#[command(name = "shopfeed-cli")]
#[command(about = "Shopfeed command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Regenerate and cache the feed for one shop, or for every known shop
    Generate {
        /// Shop domain (e.g. demo.myshopify.com)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        shop: Option<String>,
        /// Regenerate every shop that has stored settings
        #[arg(long)]
        all: bool,
    },
    /// Pull shop info and policy URLs into the shop's settings
    Sync {
        /// Shop domain
        shop: String,
    },
    /// Inspect or change per-shop feed settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Map a shop's live catalog and print NDJSON without caching it
    Preview {
        /// Shop domain
        shop: String,
        /// Print at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("shopfeed-cli: run with --help to list commands");
        return Ok(());
    };

    let config = shopfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = shopfeed_db::PoolConfig::from_app_config(&config);
    let pool = shopfeed_db::connect_pool(&config.database_url, pool_config).await?;

    if matches!(command, Commands::Migrate) {
        shopfeed_db::run_migrations(&pool).await?;
        println!("migrations applied");
        return Ok(());
    }

    let client = Arc::new(shopfeed_shopify::ShopifyClient::from_app_config(&config)?);
    let pipeline = FeedPipeline::new(pool.clone(), client, config.shop_tokens.clone());

    match command {
        Commands::Migrate => {}
        Commands::Generate { shop, all } => {
            feed::run_generate(&pipeline, shop.as_deref(), all).await?;
        }
        Commands::Sync { shop } => settings::run_sync(&pipeline, &shop).await?,
        Commands::Settings { command } => {
            settings::run_settings(&pool, &pipeline, command).await?;
        }
        Commands::Preview { shop, limit } => feed::run_preview(&pipeline, &shop, limit).await?,
    }

    Ok(())
}
