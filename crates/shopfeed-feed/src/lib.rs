//! Catalog-to-feed mapping: turns validated catalog records plus per-shop
//! settings into feed records and their NDJSON payload.

pub mod batch;
pub mod derive;
pub mod error;
pub mod mapper;
pub mod record;
pub mod text;

pub use batch::{map_all, serialize_ndjson};
pub use error::FeedError;
pub use mapper::map_one;
pub use record::{Availability, FeedRecord, ReturnsBlock};
pub use text::strip_markup;
