//! Admin-only visibility into the login throttle.

use axum::{Extension, Json, response::IntoResponse};
use std::sync::Arc;

use super::state::AuthState;
use super::types::ThrottleStatsResponse;

/// Current throttle configuration plus the number of live attempt records.
#[utoipa::path(
    get,
    path = "/v1/admin/throttle",
    responses(
        (status = 200, description = "Throttle statistics", body = ThrottleStatsResponse),
        (status = 401, description = "Access denied"),
        (status = 403, description = "Forbidden")
    ),
    tag = "admin"
)]
pub async fn throttle_stats(Extension(state): Extension<Arc<AuthState>>) -> impl IntoResponse {
    Json(ThrottleStatsResponse {
        tracked_keys: state.attempts().len().await,
        max_attempts: state.config().max_attempts(),
        window_ms: state.config().window_ms(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::principal::MemoryPrincipalDirectory;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::api::handlers::auth::store::{CounterStore, InMemoryCounterStore};
    use secrecy::SecretString;

    #[tokio::test]
    async fn stats_reflect_the_store() {
        let attempts = Arc::new(InMemoryCounterStore::new(900_000));
        attempts.register_attempt("1.2.3.4:", 1_000).await;
        attempts.register_attempt("5.6.7.8:bob@example.com", 1_000).await;

        let state = Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:3000".to_string()).with_max_attempts(10),
            &SecretString::from("sekret".to_string()),
            Arc::new(MemoryPrincipalDirectory::new()),
            attempts,
        ));

        let response = throttle_stats(Extension(state)).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body");
        let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed["tracked_keys"], 2);
        assert_eq!(parsed["max_attempts"], 10);
        assert_eq!(parsed["window_ms"], 900_000);
    }
}
