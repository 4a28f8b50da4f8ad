//! Authentication and admission control.
//!
//! Flow Overview:
//! 1) `extract` finds the candidate credential on the request.
//! 2) `token` verifies it and `principal` resolves the subject.
//! 3) `gate` wires those into soft, strict and role middleware.
//! 4) `throttle` and `store` rate limit the login route.
//! 5) `login` and `admin` are the handlers behind the gates.

pub mod admin;
pub mod error;
pub mod extract;
pub mod gate;
pub mod login;
pub mod principal;
pub mod state;
pub mod store;
pub mod throttle;
pub mod types;
mod utils;

pub mod token;

pub use error::AuthError;
pub use gate::{VerifyOutcome, require_admin, soft_gate, strict_gate, verify_request};
pub use principal::{MemoryPrincipalDirectory, PgPrincipalDirectory, Principal, PrincipalDirectory, Role};
pub use state::{AuthConfig, AuthState};
pub use store::{CounterStore, InMemoryCounterStore, spawn_sweep_task};
pub use throttle::login_throttle;
