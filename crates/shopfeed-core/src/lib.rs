pub mod app_config;
pub mod config;
pub mod products;
pub mod settings;
pub mod shop;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    numeric_id, InventoryPolicy, Product, ProductStatus, SelectedOption, Variant, VariantWeight,
    DEFAULT_OPTION_VALUE,
};
pub use settings::{FeedSettings, SettingsPatch};
pub use shop::{ShopInfo, ShopPolicies};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
