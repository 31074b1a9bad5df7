use std::collections::BTreeMap;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub shopify_api_version: String,
    pub shopify_request_timeout_secs: u64,
    pub shopify_page_size: u32,
    pub shopify_max_retries: u32,
    pub shopify_retry_backoff_base_secs: u64,
    /// Admin API access tokens keyed by shop domain.
    pub shop_tokens: BTreeMap<String, String>,
    /// Cron expression for scheduled feed refresh; `None` disables it.
    pub refresh_cron: Option<String>,
}

impl AppConfig {
    /// Looks up the Admin API token for a shop domain.
    #[must_use]
    pub fn shop_token(&self, shop: &str) -> Option<&str> {
        self.shop_tokens.get(shop).map(String::as_str)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("shopify_api_version", &self.shopify_api_version)
            .field(
                "shopify_request_timeout_secs",
                &self.shopify_request_timeout_secs,
            )
            .field("shopify_page_size", &self.shopify_page_size)
            .field("shopify_max_retries", &self.shopify_max_retries)
            .field(
                "shopify_retry_backoff_base_secs",
                &self.shopify_retry_backoff_base_secs,
            )
            .field(
                "shop_tokens",
                &self
                    .shop_tokens
                    .keys()
                    .map(|shop| (shop.as_str(), "[redacted]"))
                    .collect::<BTreeMap<_, _>>(),
            )
            .field("refresh_cron", &self.refresh_cron)
            .finish()
    }
}
