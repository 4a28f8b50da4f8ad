//! Auth configuration and shared state.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::principal::PrincipalDirectory;
use super::store::CounterStore;
use super::token::TokenKeys;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_WINDOW_MS: i64 = 15 * 60 * 1000;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    token_ttl_seconds: i64,
    max_attempts: u32,
    window_ms: i64,
    sweep_interval_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_ms: DEFAULT_WINDOW_MS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_window_ms(mut self, window_ms: i64) -> Self {
        self.window_ms = window_ms;
        self
    }

    #[must_use]
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    #[must_use]
    pub fn sweep_interval_seconds(&self) -> u64 {
        self.sweep_interval_seconds
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenKeys,
    directory: Arc<dyn PrincipalDirectory>,
    attempts: Arc<dyn CounterStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        token_secret: &SecretString,
        directory: Arc<dyn PrincipalDirectory>,
        attempts: Arc<dyn CounterStore>,
    ) -> Self {
        let tokens = TokenKeys::from_secret(
            token_secret.expose_secret().as_bytes(),
            config.token_ttl_seconds,
        );
        Self {
            config,
            tokens,
            directory,
            attempts,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    pub(crate) fn directory(&self) -> &dyn PrincipalDirectory {
        self.directory.as_ref()
    }

    pub(crate) fn attempts(&self) -> &dyn CounterStore {
        self.attempts.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::principal::MemoryPrincipalDirectory;
    use crate::api::handlers::auth::store::InMemoryCounterStore;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://gatehouse.dev".to_string());

        assert_eq!(config.frontend_base_url(), "https://gatehouse.dev");
        assert_eq!(config.token_ttl_seconds(), super::DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.max_attempts(), super::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.window_ms(), super::DEFAULT_WINDOW_MS);
        assert_eq!(
            config.sweep_interval_seconds(),
            super::DEFAULT_SWEEP_INTERVAL_SECONDS
        );
        assert!(config.session_cookie_secure());

        let config = config
            .with_token_ttl_seconds(120)
            .with_max_attempts(3)
            .with_window_ms(60_000)
            .with_sweep_interval_seconds(42);

        assert_eq!(config.token_ttl_seconds(), 120);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.window_ms(), 60_000);
        assert_eq!(config.sweep_interval_seconds(), 42);
    }

    #[test]
    fn auth_state_constructs_with_memory_backends() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let state = AuthState::new(
            config,
            &SecretString::from("sekret".to_string()),
            Arc::new(MemoryPrincipalDirectory::new()),
            Arc::new(InMemoryCounterStore::new(900_000)),
        );
        assert!(!state.config().session_cookie_secure());
        assert_eq!(state.config().max_attempts(), 10);
    }
}
