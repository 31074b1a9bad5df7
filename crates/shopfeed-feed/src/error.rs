use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to serialize feed record: {0}")]
    Serialize(#[from] serde_json::Error),
}
