use std::{net::SocketAddr, sync::Arc, time::Duration};

use admin_backend::{
    config::{Config, SessionBackend},
    db::{
        memory_session_store::InMemorySessionStore,
        postgres_appointment_repository::PostgresAppointmentRepository,
        postgres_category_repository::PostgresCategoryRepository,
        postgres_session_store::PostgresSessionStore,
        postgres_user_repository::PostgresUserRepository, session_store::SessionStore,
    },
    responses::JsonResponse,
    routes::{credential_routes, protected_routes},
    worker, AppState,
};
use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    response::IntoResponse,
    Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::{net::TcpListener, signal};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(Config::from_env().context("invalid configuration")?);
    let pool = establish_connection(&config.database_url).await?;

    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Postgres => Arc::new(PostgresSessionStore { pool: pool.clone() }),
        SessionBackend::Memory => {
            warn!("sessions are kept in memory and will not survive a restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let state = AppState::new(
        config.clone(),
        Arc::new(PostgresUserRepository { pool: pool.clone() }),
        Arc::new(PostgresCategoryRepository { pool: pool.clone() }),
        Arc::new(PostgresAppointmentRepository { pool }),
        sessions.clone(),
    );

    let rate_limit_ms: u64 = env_or("RATE_LIMITER_MILLISECONDS", 200);
    let rate_limit_burst: u32 = env_or("RATE_LIMITER_BURST", 20);
    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(rate_limit_ms)
            .burst_size(rate_limit_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid global rate limiter settings")?,
    );

    // Stricter limiter for login and token renewal
    let credential_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(env_or("RATE_LIMITER_AUTH_SECONDS", 1))
            .burst_size(env_or("RATE_LIMITER_AUTH_BURST", 10))
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many login attempts. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid credential rate limiter settings")?,
    );

    let global_limiter = global_governor_conf.limiter().clone();
    let credential_limiter = credential_governor_conf.limiter().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            global_limiter.retain_recent();
            credential_limiter.retain_recent();
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let api = credential_routes()
        .layer(GovernorLayer {
            config: credential_governor_conf,
        })
        .merge(protected_routes(state.clone()));

    let app = Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: global_governor_conf,
        })
        .layer(cors);

    let cleanup = worker::start_session_cleanup(sessions, config.session_cleanup_interval);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, backend = ?config.session_backend, "admin backend listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    cleanup.abort();
    info!("shutdown complete");
    Ok(())
}

/// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` switches
/// to one JSON object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("connected to the database");
    Ok(pool)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(?err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(?err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
