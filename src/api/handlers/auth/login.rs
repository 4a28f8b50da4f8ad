//! Session lifecycle handlers: login, logout and the two "who am I" probes.

use axum::{
    Extension, Json,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info};

use super::error::ACCESS_DENIED;
use super::extract::{clear_session_cookie, session_cookie};
use super::gate::VerifyOutcome;
use super::principal::Principal;
use super::state::AuthState;
use super::types::{LoginRequest, LoginResponse, SessionResponse};
use super::utils::{normalize_email, valid_email};
use crate::api::handlers::now_unix_seconds;

/// Exchange credentials for a bearer token.
///
/// Every failure mode answers the same 401 body; the caller learns nothing
/// about whether the account exists.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Access denied"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return (StatusCode::UNAUTHORIZED, ACCESS_DENIED.to_string()).into_response();
    }

    let principal = match state.directory().authenticate(&email, &payload.password).await {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            return (StatusCode::UNAUTHORIZED, ACCESS_DENIED.to_string()).into_response();
        }
        Err(err) => {
            error!("Login lookup failed: {err}");
            return (StatusCode::UNAUTHORIZED, ACCESS_DENIED.to_string()).into_response();
        }
    };

    let token = match state.tokens().issue(principal.id, now_unix_seconds()) {
        Ok(token) => token,
        Err(err) => {
            error!("Token issuing failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response();
        }
    };

    info!(user = %principal.id, "Login succeeded");
    let mut response =
        (StatusCode::OK, Json(LoginResponse { token: token.clone() })).into_response();
    if let Ok(cookie) = session_cookie(state.config(), &token) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

/// Drop the session cookie. Succeeds whether or not a session existed.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tag = "auth"
)]
pub async fn logout(Extension(state): Extension<Arc<AuthState>>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

/// Soft session probe: 200 for everyone, principal attached when known.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses((status = 200, description = "Session state", body = SessionResponse)),
    tag = "auth"
)]
pub async fn session(Extension(outcome): Extension<VerifyOutcome>) -> impl IntoResponse {
    let user = outcome.principal().cloned().map(Into::into);
    Json(SessionResponse {
        authenticated: user.is_some(),
        user,
    })
}

/// Strict identity probe; the strict gate guarantees the principal extension.
#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "Authenticated principal", body = super::types::PrincipalResponse),
        (status = 401, description = "Access denied")
    ),
    tag = "auth"
)]
pub async fn me(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(super::types::PrincipalResponse::from(principal))
}
