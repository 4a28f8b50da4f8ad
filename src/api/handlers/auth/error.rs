//! Gating error taxonomy and its HTTP mapping.
//!
//! Every credential failure collapses to the same 401 body so a caller cannot
//! distinguish a missing token from an expired or forged one.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub(crate) const ACCESS_DENIED: &str = "Access denied";
pub(crate) const FORBIDDEN: &str = "Forbidden";
pub(crate) const RATE_LIMITED: &str = "Too many login attempts, please try again later";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("malformed credential")]
    MalformedCredential,
    #[error("expired credential")]
    ExpiredCredential,
    #[error("invalid signature")]
    SignatureInvalid,
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("insufficient role")]
    InsufficientRole,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl AuthError {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::MissingCredential
            | Self::MalformedCredential
            | Self::ExpiredCredential
            | Self::SignatureInvalid
            | Self::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::InsufficientRole => (self.status(), FORBIDDEN.to_string()).into_response(),
            Self::RateLimitExceeded => {
                (self.status(), Json(json!({ "message": RATE_LIMITED }))).into_response()
            }
            _ => (self.status(), ACCESS_DENIED.to_string()).into_response(),
        }
    }
}
