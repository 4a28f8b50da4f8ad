//! OpenAPI document for the HTTP surface.

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;

use super::handlers::{auth, health, root};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::login::login,
        auth::login::logout,
        auth::login::session,
        auth::login::me,
        auth::admin::throttle_stats,
    ),
    components(schemas(
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::SessionResponse,
        auth::types::PrincipalResponse,
        auth::types::ThrottleStatsResponse,
        auth::principal::Role,
        health::HealthResponse,
    )),
    tags(
        (name = "auth", description = "Session lifecycle and identity probes"),
        (name = "admin", description = "Operator endpoints"),
        (name = "health", description = "Service health"),
        (name = "root", description = "Service banner")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/v1/auth/login",
            "/v1/auth/logout",
            "/v1/auth/session",
            "/v1/me",
            "/v1/admin/throttle",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }
}
