//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, throttle};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let token_secret = matches
        .get_one::<String>(auth::ARG_TOKEN_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("Missing token secret")?;

    let frontend_base_url = matches
        .get_one::<String>(auth::ARG_FRONTEND_BASE_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    let token_ttl_seconds = matches
        .get_one::<i64>(auth::ARG_TOKEN_TTL_SECONDS)
        .copied()
        .unwrap_or(43_200);

    let max_login_attempts = matches
        .get_one::<u32>(throttle::ARG_MAX_ATTEMPTS)
        .copied()
        .unwrap_or(10);

    let login_window_seconds = matches
        .get_one::<u64>(throttle::ARG_WINDOW_SECONDS)
        .copied()
        .unwrap_or(900);

    let sweep_interval_seconds = matches
        .get_one::<u64>(throttle::ARG_SWEEP_INTERVAL_SECONDS)
        .copied()
        .unwrap_or(300);

    Ok(Action::Server(Box::new(Args {
        port,
        dsn,
        token_secret,
        frontend_base_url,
        token_ttl_seconds,
        max_login_attempts,
        login_window_seconds,
        sweep_interval_seconds,
    })))
}
