//! Fixed-window login throttle.
//!
//! Flow Overview:
//! 1) Scope to POST; other methods pass through untouched.
//! 2) Buffer the body, derive the throttle key (client address + account).
//! 3) Register the attempt; over the limit means an early 429.
//! 4) Otherwise run the handler; a success response clears the key.
//! 5) Rate-limit headers go on every response the throttle touches.

use axum::{
    Extension,
    body::Body,
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use super::error::AuthError;
use super::state::AuthState;
use super::utils::{extract_client_ip, safe_account, throttle_key};
use crate::api::handlers::now_unix_millis;

/// Upper bound on the buffered login body; anything larger is counted as an
/// anonymous attempt rather than rejected here.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Standard rate-limit response headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RateLimitHeaders {
    limit: u32,
    remaining: u32,
    reset_epoch_seconds: i64,
    retry_after_seconds: Option<i64>,
}

impl RateLimitHeaders {
    fn new(limit: u32, count: u32, reset_ms: i64, now_ms: i64) -> Self {
        let delta_ms = reset_ms.saturating_sub(now_ms);
        let retry_after = delta_ms.div_euclid(1000) + i64::from(delta_ms.rem_euclid(1000) > 0);
        Self {
            limit,
            remaining: limit.saturating_sub(count),
            reset_epoch_seconds: reset_ms.div_euclid(1000),
            retry_after_seconds: (retry_after > 0).then_some(retry_after),
        }
    }

    fn apply(self, headers: &mut HeaderMap, include_retry_after: bool) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from(self.reset_epoch_seconds),
        );
        if include_retry_after {
            if let Some(seconds) = self.retry_after_seconds {
                headers.insert("retry-after", HeaderValue::from(seconds));
            }
        }
    }
}

/// Throttle middleware for the login route.
pub async fn login_throttle(
    Extension(state): Extension<Arc<AuthState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Failed to buffer login body: {err}");
            axum::body::Bytes::new()
        }
    };

    let account = serde_json::from_slice::<serde_json::Value>(&bytes)
        .map(|body| safe_account(body.get("email")))
        .unwrap_or_default();
    let client_address = extract_client_ip(&parts.headers)
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    let key = throttle_key(&client_address, &account);

    let limit = state.config().max_attempts();
    let window_ms = state.config().window_ms();
    let now_ms = now_unix_millis();
    let snapshot = state.attempts().register_attempt(&key, now_ms).await;
    let reset_ms = snapshot.window_start_ms.saturating_add(window_ms);
    let headers = RateLimitHeaders::new(limit, snapshot.count, reset_ms, now_ms);

    if snapshot.count > limit {
        warn!(
            client = %client_address,
            attempts = snapshot.count,
            "Login throttled"
        );
        let mut response = AuthError::RateLimitExceeded.into_response();
        headers.apply(response.headers_mut(), true);
        return response;
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let mut response = next.run(request).await;
    if response.status().is_success() {
        state.attempts().clear(&key).await;
    }
    headers.apply(response.headers_mut(), false);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::principal::MemoryPrincipalDirectory;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::api::handlers::auth::store::InMemoryCounterStore;
    use axum::{
        Router,
        http::StatusCode,
        middleware::from_fn,
        routing::{get, post},
    };
    use secrecy::SecretString;
    use tower::ServiceExt;

    const WINDOW_MS: i64 = 900_000;

    fn test_state(max_attempts: u32) -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:3000".to_string())
            .with_max_attempts(max_attempts)
            .with_window_ms(WINDOW_MS);
        Arc::new(AuthState::new(
            config,
            &SecretString::from("sekret".to_string()),
            Arc::new(MemoryPrincipalDirectory::new()),
            Arc::new(InMemoryCounterStore::new(WINDOW_MS)),
        ))
    }

    fn app(state: Arc<AuthState>, login_status: StatusCode) -> Router {
        Router::new()
            .route("/login", post(move || async move { login_status }))
            .route("/login", get(|| async { StatusCode::OK }))
            .layer(from_fn(login_throttle))
            .layer(Extension(state))
    }

    fn login_request(ip: &str, email: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(format!(
                "{{\"email\":\"{email}\",\"password\":\"nope\"}}"
            )))
            .expect("request")
    }

    #[test]
    fn headers_compute_remaining_reset_and_retry_after() {
        let headers = RateLimitHeaders::new(10, 3, 900_500, 500);
        assert_eq!(headers.remaining, 7);
        assert_eq!(headers.reset_epoch_seconds, 900);
        assert_eq!(headers.retry_after_seconds, Some(900));

        // Partial seconds round up.
        let headers = RateLimitHeaders::new(10, 11, 1_500, 999);
        assert_eq!(headers.remaining, 0);
        assert_eq!(headers.retry_after_seconds, Some(1));

        // An already-elapsed window yields no Retry-After.
        let headers = RateLimitHeaders::new(10, 11, 1_000, 2_000);
        assert_eq!(headers.retry_after_seconds, None);
    }

    #[tokio::test]
    async fn attempts_over_the_limit_are_rejected() {
        let state = test_state(3);
        for _ in 0..3 {
            let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
                .oneshot(login_request("1.2.3.4", "alice@example.com"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().contains_key("x-ratelimit-limit"));
            assert!(!response.headers().contains_key("retry-after"));
        }

        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(login_request("1.2.3.4", "alice@example.com"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("x-ratelimit-remaining"),
            Some(&HeaderValue::from_static("0"))
        );
        assert!(response.headers().contains_key("retry-after"));
    }

    #[tokio::test]
    async fn success_clears_the_key() {
        let state = test_state(3);
        for _ in 0..2 {
            app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
                .oneshot(login_request("1.2.3.4", "alice@example.com"))
                .await
                .expect("response");
        }

        let response = app(Arc::clone(&state), StatusCode::OK)
            .oneshot(login_request("1.2.3.4", "alice@example.com"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        // The bucket restarts from scratch after the success.
        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(login_request("1.2.3.4", "alice@example.com"))
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-ratelimit-remaining"),
            Some(&HeaderValue::from_static("2"))
        );
    }

    #[tokio::test]
    async fn different_accounts_use_different_buckets() {
        let state = test_state(1);
        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(login_request("1.2.3.4", "alice@example.com"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(login_request("1.2.3.4", "bob@example.com"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(login_request("1.2.3.4", "alice@example.com"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn malformed_bodies_share_the_anonymous_bucket() {
        let state = test_state(1);
        let request = |body: &str| {
            Request::builder()
                .method(Method::POST)
                .uri("/login")
                .header("x-forwarded-for", "1.2.3.4")
                .body(Body::from(body.to_string()))
                .expect("request")
        };

        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(request("not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
            .oneshot(request("{\"email\": 42}"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn non_post_requests_bypass_the_throttle() {
        let state = test_state(1);
        for _ in 0..5 {
            let request = Request::builder()
                .method(Method::GET)
                .uri("/login")
                .header("x-forwarded-for", "1.2.3.4")
                .body(Body::empty())
                .expect("request");
            let response = app(Arc::clone(&state), StatusCode::UNAUTHORIZED)
                .oneshot(request)
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key("x-ratelimit-limit"));
        }
    }
}
