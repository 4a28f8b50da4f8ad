//! Liveness and readiness probe.

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{Instrument, error, info_span};
use utoipa::ToSchema;

use crate::GIT_COMMIT_HASH;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub commit: String,
    /// "ok", "error" or "none" when running without a database.
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(Extension(pool): Extension<Option<PgPool>>) -> impl IntoResponse {
    let (status, database) = match pool {
        Some(pool) => {
            let span = info_span!("db.query", db.system = "postgresql", db.operation = "SELECT");
            match sqlx::query("SELECT 1").execute(&pool).instrument(span).await {
                Ok(_) => (StatusCode::OK, "ok"),
                Err(err) => {
                    error!("Health check query failed: {err}");
                    (StatusCode::SERVICE_UNAVAILABLE, "error")
                }
            }
        }
        None => (StatusCode::OK, "none"),
    };

    (
        status,
        Json(HealthResponse {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: GIT_COMMIT_HASH.to_string(),
            database: database.to_string(),
        }),
    )
}
