//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{
    AuthAppState, BootstrapAdminUseCase, PgAuthRepository, ResetMailNotifier, account_router,
    admin_users_router, auth_router, spawn_refresh_token_sweep, sweep_once,
};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use platform::mail::Mailer;
use serde_json::{Value, json};
use shop::{PgShopRepository, ShopAppState, admin_products_router, cart_router, products_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,shop=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.auth.store_timeout)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = Arc::new(PgAuthRepository::with_timeout(
        pool.clone(),
        config.auth.store_timeout,
    ));
    let shop_repo = Arc::new(PgShopRepository::with_timeout(
        pool.clone(),
        config.auth.store_timeout,
    ));

    // One-time admin account
    if let Some(seed) = config.admin {
        match BootstrapAdminUseCase::new(auth_repo.clone()).execute(seed).await {
            Ok(true) => tracing::info!("Bootstrap admin account created"),
            Ok(false) => tracing::info!("Admin account already present, bootstrap skipped"),
            Err(e) => tracing::warn!(error = %e, "Admin bootstrap failed, continuing anyway"),
        }
    }

    // Startup cleanup, then the periodic sweep
    sweep_once(&*auth_repo).await;
    spawn_refresh_token_sweep(auth_repo.clone(), config.auth.sweep_interval);

    let notifier = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP notifier enabled");
            ResetMailNotifier::smtp(Mailer::new(smtp)?, config.reset_url_base.clone())
        }
        None => {
            tracing::warn!("SMTP_HOST not set; reset links will not be mailed");
            ResetMailNotifier::LogOnly
        }
    };

    let auth_state = AuthAppState::new(auth_repo, Arc::new(notifier), Arc::new(config.auth));
    let shop_state = ShopAppState::new(shop_repo);
    let guard = auth_state.guard();

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = health_router()
        .nest("/auth", auth_router(auth_state.clone()))
        .nest("/users", account_router(auth_state.clone()))
        .nest("/admin/users", admin_users_router(auth_state))
        .nest("/products", products_router(shop_state.clone()))
        .nest(
            "/admin/products",
            admin_products_router(shop_state.clone(), guard.clone()),
        )
        .nest("/cart", cart_router(shop_state, guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn health_router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
