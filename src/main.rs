// src/main.rs
use anyhow::Context;
use dotenv::dotenv;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod foods;
mod logging_middleware;
mod requests;
mod store;

#[cfg(test)]
mod test_support;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::{FirebaseVerifier, IdentityVerifier, ServiceAccount};
use common::{AppState, Config};
use store::{DocumentStore, MongoStore};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = Config::from_env()?;

    // ========================================================================
    // DOCUMENT STORE
    // ========================================================================

    let store = MongoStore::connect(&config.mongo_uri, &config.db_name)
        .await
        .context("invalid MongoDB connection string")?;

    // The pool reconnects on demand, so an unreachable store is not fatal here
    if let Err(e) = store.ensure_connected().await {
        warn!(error = %e, "MongoDB not reachable yet; requests will retry");
    } else {
        info!("MongoDB connected");
    }

    // ========================================================================
    // IDENTITY VERIFICATION
    // ========================================================================

    let verifier: Option<Arc<dyn IdentityVerifier>> = match &config.service_key {
        Some(encoded) => {
            let account = ServiceAccount::from_base64(encoded)
                .context("FB_SERVICE_KEY could not be decoded")?;
            let http = Client::builder().build()?;
            let firebase = FirebaseVerifier::new(&account, config.jwks_url.clone(), http);
            Some(Arc::new(firebase) as Arc<dyn IdentityVerifier>)
        }
        None => {
            warn!("FB_SERVICE_KEY not set; protected routes will fail as unconfigured");
            None
        }
    };

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let state = AppState::new(Arc::new(store), verifier);
    let app = app::build_router(state, config.cors_origins.as_deref());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
