//! Settings command handlers.

use clap::Subcommand;
use shopfeed_core::{FeedSettings, SettingsPatch};
use shopfeed_server::pipeline::FeedPipeline;
use sqlx::PgPool;

/// Sub-commands available under `settings`.
#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print a shop's settings, creating defaults on first use
    Show {
        /// Shop domain
        shop: String,
    },
    /// Apply a partial update given as a JSON object
    Set {
        /// Shop domain
        shop: String,
        /// Fields to change, e.g. '{"enable_checkout":true,"seller_name":null}'
        #[arg(long)]
        json: String,
    },
    /// List every shop that has stored settings
    List,
    /// Remove a shop's settings and cached feed
    Delete {
        /// Shop domain
        shop: String,
    },
}

/// Parse and validate a settings patch from JSON text.
pub(crate) fn parse_patch(raw: &str) -> anyhow::Result<SettingsPatch> {
    let patch: SettingsPatch = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invalid settings JSON: {e}"))?;
    if patch.return_deadline_days.is_some_and(|days| days < 0) {
        anyhow::bail!("return_deadline_days must not be negative");
    }
    Ok(patch)
}

fn print_settings(settings: &FeedSettings) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

/// Dispatch a `settings` sub-command.
///
/// # Errors
///
/// Returns an error if the patch is invalid or a store call fails.
pub(crate) async fn run_settings(
    pool: &PgPool,
    pipeline: &FeedPipeline,
    command: SettingsCommands,
) -> anyhow::Result<()> {
    match command {
        SettingsCommands::Show { shop } => {
            let settings = shopfeed_db::get_or_create_settings(pool, &shop).await?;
            print_settings(&settings)
        }
        SettingsCommands::Set { shop, json } => {
            let patch = parse_patch(&json)?;
            if patch.is_empty() {
                println!("no fields given; nothing changed");
                return Ok(());
            }
            shopfeed_db::update_settings(pool, &shop, &patch).await?;
            let settings = shopfeed_db::get_or_create_settings(pool, &shop).await?;
            print_settings(&settings)
        }
        SettingsCommands::List => {
            for shop in shopfeed_db::list_settings_shops(pool).await? {
                println!("{shop}");
            }
            Ok(())
        }
        SettingsCommands::Delete { shop } => {
            pipeline.remove_shop(&shop).await?;
            println!("{shop}: settings and cached feed removed");
            Ok(())
        }
    }
}

/// Re-pull shop info and policy URLs, then print the resulting settings.
///
/// # Errors
///
/// Returns an error if the shop has no token or the fetch or write fails.
pub(crate) async fn run_sync(pipeline: &FeedPipeline, shop: &str) -> anyhow::Result<()> {
    let settings = pipeline.auto_populate(shop).await?;
    print_settings(&settings)
}
