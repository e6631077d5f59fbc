use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared-secret bearer auth for the trigger endpoints.
#[derive(Clone)]
pub struct AuthState {
    secret: Option<Arc<str>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth state from the configured cron secret.
    ///
    /// The config loader already rejects a missing secret outside
    /// development, so `None` here means a deliberate dev setup; auth is
    /// disabled with a warning for local iteration.
    #[must_use]
    pub fn from_config(config: &dealgrid_core::AppConfig) -> Self {
        match &config.cron_secret {
            Some(secret) => Self {
                secret: Some(Arc::from(secret.as_str())),
                enabled: true,
            },
            None => {
                tracing::warn!(
                    "DEALGRID_CRON_SECRET not set; bearer auth disabled in development environment"
                );
                Self {
                    secret: None,
                    enabled: false,
                }
            }
        }
    }

    /// Constant-time comparison against the configured secret.
    fn allows(&self, token: &str) -> bool {
        self.secret
            .as_deref()
            .is_some_and(|secret| token.as_bytes().ct_eq(secret.as_bytes()).into())
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the shared bearer secret when enabled.
///
/// Rejection happens before any handler runs, so an unauthorized request
/// never triggers scraping or reconciliation work.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid bearer token",
                },
            }),
        )
            .into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "rate limit exceeded",
                },
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_with_secret(secret: &str) -> AuthState {
        AuthState {
            secret: Some(Arc::from(secret)),
            enabled: true,
        }
    }

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn extract_bearer_token_rejects_blank_token() {
        let header = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn allows_accepts_only_the_exact_secret() {
        let auth = auth_with_secret("s3cret");
        assert!(auth.allows("s3cret"));
        assert!(!auth.allows("s3cret "));
        assert!(!auth.allows("other"));
        assert!(!auth.allows(""));
    }

    #[test]
    fn auth_disabled_when_config_has_no_secret() {
        let config = dealgrid_core::AppConfig {
            database_url: "postgres://example".to_string(),
            env: dealgrid_core::Environment::Development,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            cron_secret: None,
            db_max_connections: 1,
            db_min_connections: 1,
            db_acquire_timeout_secs: 1,
            scraper_request_timeout_secs: 5,
            scraper_user_agent: "ua".to_string(),
            scraper_max_retries: 0,
            scraper_retry_backoff_base_secs: 0,
            scraper_max_concurrent_sources: 1,
            appsumo_partner_id: None,
            scrape_cron: None,
            expire_cron: None,
        };
        let state = AuthState::from_config(&config);
        assert!(!state.enabled);
    }
}
