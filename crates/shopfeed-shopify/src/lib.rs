//! Shopify Admin GraphQL client for catalog, shop and policy reads.
//!
//! Wire types stay private to this crate; callers only see the validated
//! `shopfeed_core` types produced by [`normalize`].

pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
mod queries;
mod rate_limit;
pub mod types;

pub use client::ShopifyClient;
pub use error::ShopifyError;
pub use normalize::{normalize_policies, normalize_product, normalize_shop};
