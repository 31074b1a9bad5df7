//! Postgres persistence: per-shop feed settings and the cached feed payload.
//!
//! All operations are free functions over a [`sqlx::PgPool`] keyed by the
//! shop domain.

mod error;
pub mod feed_cache;
mod pool;
pub mod settings;

pub use error::DbError;
pub use feed_cache::{delete_feed, read_feed, replace_feed, CachedFeedRow};
pub use pool::{connect_pool, health_check, run_migrations, PoolConfig};
pub use settings::{
    delete_settings, delete_shop, get_or_create_settings, get_settings, list_settings_shops,
    update_settings, FeedSettingsRow,
};
