//! Request gating middleware.
//!
//! Flow Overview:
//! 1) Extract the candidate credential (cookie, then bearer header).
//! 2) Verify signature and expiry, then resolve the subject in the directory.
//! 3) Soft gate attaches the outcome and always continues; strict gate
//!    rejects with 401 before the handler runs; the role gate rejects with
//!    403 when the resolved principal lacks the required role.

use axum::{
    Extension,
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::error::AuthError;
use super::extract::extract_credential;
use super::principal::{Principal, Role};
use super::state::AuthState;
use super::token::TokenError;

/// Result of verifying one request's credential.
///
/// Three-way by design: "no credential presented" and "credential presented
/// but bad" are different facts, and the soft gate must not conflate them.
#[derive(Clone, Debug, PartialEq)]
pub enum VerifyOutcome {
    Authenticated(Principal),
    Unauthenticated,
    Invalid(AuthError),
}

impl VerifyOutcome {
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Unauthenticated | Self::Invalid(_) => None,
        }
    }
}

/// Verify the credential carried by `headers`, if any.
///
/// Never panics and never propagates an error; directory failures are logged
/// and collapse to an invalid outcome so the gate fails closed.
pub async fn verify_request(state: &AuthState, headers: &HeaderMap) -> VerifyOutcome {
    let Some(candidate) = extract_credential(headers) else {
        return VerifyOutcome::Unauthenticated;
    };

    let claims = match state.tokens().verify(&candidate) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => return VerifyOutcome::Invalid(AuthError::ExpiredCredential),
        Err(TokenError::Signature) => return VerifyOutcome::Invalid(AuthError::SignatureInvalid),
        Err(TokenError::Malformed) => {
            return VerifyOutcome::Invalid(AuthError::MalformedCredential);
        }
    };

    let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
        return VerifyOutcome::Invalid(AuthError::MalformedCredential);
    };

    match state.directory().lookup(user_id).await {
        Ok(Some(principal)) => VerifyOutcome::Authenticated(principal),
        Ok(None) => VerifyOutcome::Invalid(AuthError::PrincipalNotFound),
        Err(err) => {
            error!("Principal lookup failed: {err}");
            VerifyOutcome::Invalid(AuthError::PrincipalNotFound)
        }
    }
}

/// Soft gate: attach the verification outcome and always run the handler.
pub async fn soft_gate(
    Extension(state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = verify_request(&state, request.headers()).await;
    request.extensions_mut().insert(outcome);
    next.run(request).await
}

/// Strict gate: reject with 401 unless the credential resolves to a principal.
pub async fn strict_gate(
    Extension(state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match verify_request(&state, request.headers()).await {
        VerifyOutcome::Authenticated(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        VerifyOutcome::Unauthenticated => AuthError::MissingCredential.into_response(),
        VerifyOutcome::Invalid(error) => error.into_response(),
    }
}

/// Role gate: 403 unless a previously attached principal holds the admin
/// role. A missing principal is treated as insufficient, never as a bug.
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.role == Role::Admin => next.run(request).await,
        _ => AuthError::InsufficientRole.into_response(),
    }
}
