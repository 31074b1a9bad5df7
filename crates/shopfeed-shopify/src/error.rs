use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {shop} (retry after {retry_after_secs}s)")]
    RateLimited { shop: String, retry_after_secs: u64 },

    #[error("access token rejected by {shop}")]
    Unauthorized { shop: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("GraphQL errors from {shop}: {messages}")]
    GraphQl { shop: String, messages: String },

    #[error("malformed response from {shop}: {reason}")]
    MalformedResponse { shop: String, reason: String },

    #[error("pagination limit reached for {shop}: exceeded {max_pages} pages")]
    PaginationLimit { shop: String, max_pages: usize },

    #[error("invalid shop domain \"{shop}\": {reason}")]
    InvalidShopDomain { shop: String, reason: String },
}
