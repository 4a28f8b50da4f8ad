use crate::api;
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub token_secret: SecretString,
    pub frontend_base_url: String,
    pub token_ttl_seconds: i64,
    pub max_login_attempts: u32,
    pub login_window_seconds: u64,
    pub sweep_interval_seconds: u64,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database connection or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = api::handlers::auth::AuthConfig::new(args.frontend_base_url)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_max_attempts(args.max_login_attempts)
        .with_window_ms(i64::try_from(args.login_window_seconds * 1000).unwrap_or(900_000))
        .with_sweep_interval_seconds(args.sweep_interval_seconds);

    api::new(args.port, args.dsn, auth_config, args.token_secret).await
}
