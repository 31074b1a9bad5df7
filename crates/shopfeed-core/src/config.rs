use std::collections::BTreeMap;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SHOPFEED_ENV", "development"))?;

    let bind_addr = parse_addr("SHOPFEED_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SHOPFEED_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SHOPFEED_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHOPFEED_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPFEED_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "must not exceed SHOPFEED_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("SHOPFEED_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let shopify_api_version = or_default("SHOPFEED_SHOPIFY_API_VERSION", "2025-01");
    let shopify_request_timeout_secs = parse_u64("SHOPFEED_SHOPIFY_REQUEST_TIMEOUT_SECS", "30")?;
    let shopify_page_size = parse_u32("SHOPFEED_SHOPIFY_PAGE_SIZE", "100")?;
    if !(1..=250).contains(&shopify_page_size) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPFEED_SHOPIFY_PAGE_SIZE".to_string(),
            reason: "must be between 1 and 250".to_string(),
        });
    }
    let shopify_max_retries = parse_u32("SHOPFEED_SHOPIFY_MAX_RETRIES", "3")?;
    let shopify_retry_backoff_base_secs =
        parse_u64("SHOPFEED_SHOPIFY_RETRY_BACKOFF_BASE_SECS", "2")?;

    let shop_tokens = parse_shop_tokens(&or_default("SHOPFEED_SHOP_TOKENS", ""))?;
    let refresh_cron = lookup("SHOPFEED_REFRESH_CRON")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        shopify_api_version,
        shopify_request_timeout_secs,
        shopify_page_size,
        shopify_max_retries,
        shopify_retry_backoff_base_secs,
        shop_tokens,
        refresh_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPFEED_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

/// Parses `shop=token,shop=token` pairs. Blank entries are ignored.
fn parse_shop_tokens(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut tokens = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((shop, token)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidEnvVar {
                var: "SHOPFEED_SHOP_TOKENS".to_string(),
                reason: "entries must be of the form shop=token".to_string(),
            });
        };
        let (shop, token) = (shop.trim(), token.trim());
        if shop.is_empty() || token.is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: "SHOPFEED_SHOP_TOKENS".to_string(),
                reason: "shop and token must both be non-empty".to_string(),
            });
        }
        tokens.insert(shop.to_string(), token.to_string());
    }
    Ok(tokens)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
