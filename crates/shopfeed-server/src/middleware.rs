//! Request ids, bearer auth and per-client rate limiting.
//!
//! Rejections use the same `{ error, meta }` envelope as handler errors.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, ErrorCode};

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;
const ANONYMOUS_CLIENT: &str = "anonymous";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Which configured API key authenticated the request, by position in
/// `SHOPFEED_API_KEYS`. Stored as a request extension; never the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiKeyId(pub usize);

/// API key auth settings used by middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from `SHOPFEED_API_KEYS` (comma-separated bearer tokens).
    ///
    /// # Errors
    ///
    /// See [`AuthState::from_raw`].
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("SHOPFEED_API_KEYS").unwrap_or_default();
        Self::from_raw(&raw, is_development)
    }

    /// Builds auth config from a comma-separated key list.
    ///
    /// No keys disables auth in development and is an error anywhere else.
    ///
    /// # Errors
    ///
    /// Fails outside development when `raw` contains no keys.
    pub fn from_raw(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut api_keys: Vec<String> = Vec::new();
        for key in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !api_keys.iter().any(|k| k == key) {
                api_keys.push(key.to_owned());
            }
        }

        match (api_keys.is_empty(), is_development) {
            (true, true) => {
                tracing::warn!("SHOPFEED_API_KEYS not set; settings and hook routes are open");
                Ok(Self {
                    api_keys: Arc::new(api_keys),
                    enabled: false,
                })
            }
            (true, false) => anyhow::bail!(
                "SHOPFEED_API_KEYS is required outside development; provide comma-separated bearer tokens"
            ),
            (false, _) => Ok(Self {
                api_keys: Arc::new(api_keys),
                enabled: true,
            }),
        }
    }

    fn identify(&self, token: &str) -> Option<ApiKeyId> {
        self.api_keys.iter().position(|k| k == token).map(ApiKeyId)
    }
}

/// Fixed-window limiter with one window per client.
///
/// A client is the API key that authenticated the request; with auth
/// disabled every caller shares one anonymous window. Caller-supplied
/// headers never choose the window, so the map holds at most one entry per
/// configured key plus one.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`. Returns the seconds until the window
    /// resets when the client is over its limit.
    async fn check(&self, client: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Expired windows are dropped so idle clients do not accumulate.
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows.entry(client.to_owned()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if entry.count >= self.max_requests {
            let remaining = self
                .window
                .saturating_sub(now.duration_since(entry.started_at));
            return Err(remaining.as_secs().max(1));
        }
        entry.count += 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

fn client_key(key_id: Option<ApiKeyId>) -> String {
    key_id.map_or_else(
        || ANONYMOUS_CLIENT.to_owned(),
        |ApiKeyId(index)| format!("key#{index}"),
    )
}

/// Uses a well-formed incoming `x-request-id` or generates a `UUIDv4`, stores
/// it as a [`RequestId`] extension and echoes it on the response.
///
/// Incoming ids longer than 128 bytes or with non-printable characters are
/// replaced.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| {
            !v.is_empty()
                && v.len() <= MAX_REQUEST_ID_LEN
                && v.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Rejects requests without an accepted bearer token when auth is enabled,
/// and tags accepted ones with their [`ApiKeyId`].
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let key_id = extract_bearer_token(req.headers().get(header::AUTHORIZATION))
        .and_then(|token| auth.identify(token));
    match key_id {
        Some(id) => {
            req.extensions_mut().insert(id);
            next.run(req).await
        }
        None => ApiError::new(
            request_id_of(&req),
            ErrorCode::Unauthorized,
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Rejects a client's requests past the per-window limit with 429 and
/// `Retry-After`. Runs after [`require_bearer_auth`].
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(req.extensions().get::<ApiKeyId>().copied());
    match rate_limit.check(&client).await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!(client = %client, retry_after, "rate limit exceeded");
            let mut res = ApiError::new(
                request_id_of(&req),
                ErrorCode::RateLimited,
                "rate limit exceeded",
            )
            .into_response();
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            res
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
