//! Principals and the directory that resolves them.
//!
//! The gate holds a principal only for the lifetime of one request, after a
//! directory lookup. Nothing here is cached across requests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// Resolved caller identity attached to request context by the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Lenient parse from stored text; unknown roles never grant privileges.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Narrow contract against the user store.
///
/// `lookup` resolves a subject identifier; `authenticate` backs the login
/// handler. Both are the only suspension points in the gating layer.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn lookup(&self, id: Uuid) -> Result<Option<Principal>>;
    async fn authenticate(&self, email_normalized: &str, password: &str)
    -> Result<Option<Principal>>;
}

/// Hash a password for storage comparison; raw values never touch the database.
pub(crate) fn hash_password(password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Postgres-backed directory.
pub struct PgPrincipalDirectory {
    pool: PgPool,
}

impl PgPrincipalDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn principal_from_row(row: &sqlx::postgres::PgRow) -> Principal {
        let role: String = row.get("role");
        Principal {
            id: row.get("id"),
            email: row.get("email"),
            role: Role::parse(&role),
            email_verified: row.get("email_verified"),
        }
    }
}

#[async_trait]
impl PrincipalDirectory for PgPrincipalDirectory {
    async fn lookup(&self, id: Uuid) -> Result<Option<Principal>> {
        let query = "SELECT id, email, role, email_verified FROM users WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("Failed to look up principal")?;
        Ok(row.as_ref().map(Self::principal_from_row))
    }

    async fn authenticate(
        &self,
        email_normalized: &str,
        password: &str,
    ) -> Result<Option<Principal>> {
        let query =
            "SELECT id, email, role, email_verified, password_hash FROM users WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(email_normalized)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("Failed to look up login record")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored: Vec<u8> = row.get("password_hash");
        if stored == hash_password(password) {
            Ok(Some(Self::principal_from_row(&row)))
        } else {
            Ok(None)
        }
    }
}

/// In-memory directory for local development and tests.
#[derive(Default)]
pub struct MemoryPrincipalDirectory {
    users: RwLock<HashMap<Uuid, (Principal, Vec<u8>)>>,
}

impl MemoryPrincipalDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, principal: Principal, password: &str) {
        let mut users = self.users.write().await;
        users.insert(principal.id, (principal, hash_password(password)));
    }
}

#[async_trait]
impl PrincipalDirectory for MemoryPrincipalDirectory {
    async fn lookup(&self, id: Uuid) -> Result<Option<Principal>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|(principal, _)| principal.clone()))
    }

    async fn authenticate(
        &self,
        email_normalized: &str,
        password: &str,
    ) -> Result<Option<Principal>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|(principal, hash)| {
                principal.email == email_normalized && *hash == hash_password(password)
            })
            .map(|(principal, _)| principal.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(email: &str, role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            email_verified: true,
        }
    }

    #[test]
    fn role_parse_is_lenient_and_fail_closed() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse(" Admin "), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn hash_password_stable() {
        assert_eq!(hash_password("hunter2"), hash_password("hunter2"));
        assert_ne!(hash_password("hunter2"), hash_password("hunter3"));
    }

    #[tokio::test]
    async fn memory_directory_lookup_and_authenticate() -> Result<()> {
        let directory = MemoryPrincipalDirectory::new();
        let alice = principal("alice@example.com", Role::Admin);
        directory.insert(alice.clone(), "hunter2").await;

        assert_eq!(directory.lookup(alice.id).await?, Some(alice.clone()));
        assert_eq!(directory.lookup(Uuid::new_v4()).await?, None);

        assert_eq!(
            directory.authenticate("alice@example.com", "hunter2").await?,
            Some(alice)
        );
        assert_eq!(
            directory.authenticate("alice@example.com", "wrong").await?,
            None
        );
        assert_eq!(
            directory.authenticate("bob@example.com", "hunter2").await?,
            None
        );
        Ok(())
    }
}
