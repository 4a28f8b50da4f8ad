//! Wire types for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::principal::{Principal, Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of the soft session probe. `authenticated` is the discriminant; the
/// principal fields are only present when it is true.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PrincipalResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrincipalResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
}

impl From<Principal> for PrincipalResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            email: principal.email,
            role: principal.role,
            email_verified: principal.email_verified,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThrottleStatsResponse {
    /// Live attempt records in the counter store.
    pub tracked_keys: usize,
    pub max_attempts: u32,
    pub window_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_response_omits_absent_user() {
        let body = serde_json::to_value(SessionResponse {
            authenticated: false,
            user: None,
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({"authenticated": false}));
    }

    #[test]
    fn principal_response_serializes_role_lowercase() {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(PrincipalResponse {
            id,
            email: "alice@example.com".to_string(),
            role: Role::Admin,
            email_verified: true,
        })
        .expect("serialize");
        assert_eq!(body["role"], "admin");
        assert_eq!(body["email"], "alice@example.com");
    }

    #[test]
    fn login_request_deserializes() {
        let request: LoginRequest =
            serde_json::from_str("{\"email\":\"a@b.co\",\"password\":\"pw\"}").expect("parse");
        assert_eq!(request.email, "a@b.co");
        assert_eq!(request.password, "pw");
    }
}
