use crate::api::handlers::{auth, health, root};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn,
    routing::{get, post},
};
use secrecy::SecretString;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span, warn};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Build the full router: public routes, the throttled login route, and the
/// gated probe and admin routes. CORS and server wiring happen in `new`.
#[must_use]
pub fn app(auth_state: Arc<auth::AuthState>, pool: Option<PgPool>) -> Router {
    let login = Router::new()
        .route("/v1/auth/login", post(auth::login::login))
        .layer(from_fn(auth::login_throttle));

    let soft = Router::new()
        .route("/v1/auth/session", get(auth::login::session))
        .layer(from_fn(auth::soft_gate));

    let strict = Router::new()
        .route("/v1/me", get(auth::login::me))
        .layer(from_fn(auth::strict_gate));

    // The strict gate runs first (outer layer), then the role gate sees the
    // principal it attached.
    let admin = Router::new()
        .route("/v1/admin/throttle", get(auth::admin::throttle_stats))
        .layer(from_fn(auth::require_admin))
        .layer(from_fn(auth::strict_gate));

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/v1/openapi.json", get(openapi::openapi_json))
        .route("/v1/auth/logout", post(auth::login::logout))
        .merge(login)
        .merge(soft)
        .merge(strict)
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state)),
        )
        .layer(Extension(pool))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: Option<String>,
    auth_config: auth::AuthConfig,
    token_secret: SecretString,
) -> Result<()> {
    let pool = match &dsn {
        Some(dsn) => Some(
            PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?,
        ),
        None => None,
    };

    let directory: Arc<dyn auth::PrincipalDirectory> = match &pool {
        Some(pool) => Arc::new(auth::PgPrincipalDirectory::new(pool.clone())),
        None => {
            warn!("No DSN configured, using the in-memory principal directory");
            Arc::new(auth::MemoryPrincipalDirectory::new())
        }
    };

    let attempts: Arc<dyn auth::CounterStore> =
        Arc::new(auth::InMemoryCounterStore::new(auth_config.window_ms()));
    auth::spawn_sweep_task(
        Arc::clone(&attempts),
        Duration::from_secs(auth_config.sweep_interval_seconds()),
    );

    let frontend = frontend_origin(auth_config.frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(frontend))
        .allow_credentials(true);

    let auth_state = Arc::new(auth::AuthState::new(
        auth_config,
        &token_secret,
        directory,
        attempts,
    ));

    let app = app(auth_state, pool).layer(cors);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_path_and_keeps_port() {
        let origin = frontend_origin("https://app.example.com:8443/login").expect("origin");
        assert_eq!(origin, HeaderValue::from_static("https://app.example.com:8443"));

        let origin = frontend_origin("http://localhost:3000").expect("origin");
        assert_eq!(origin, HeaderValue::from_static("http://localhost:3000"));
    }

    #[test]
    fn frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("mailto:alice@example.com").is_err());
    }
}
