//! StoreRate - store rating API server
//!
//! Users register, browse stores, and rate each store from 1 to 5.
//! Admins manage users and stores; store owners see ratings for their store.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storerate_backend::{
    auth::{validation::validate_password, JwtHandler},
    config::Config,
    create_router,
    db::Database,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    let db_path = config.resolved_database_path();
    let db = Database::open(&db_path)?.with_bcrypt_cost(config.bcrypt_cost);

    if let Some(admin) = config.bootstrap_admin() {
        validate_password(&admin.password)
            .map_err(|e| anyhow!("ADMIN_PASSWORD rejected: {e}"))?;
        db.ensure_admin(&admin.name, &admin.email, &admin.password)?;
    }

    let jwt_handler = Arc::new(JwtHandler::with_ttl(
        &config.jwt_secret,
        config.token_ttl(),
    ));
    let state = AppState::new(db, jwt_handler);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("StoreRate API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storerate_backend=debug,storerate=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate's own .env when run with --manifest-path from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
