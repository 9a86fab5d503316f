use std::{path::Path, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;

use crate::error::AppResult;
use crate::model::{DbConnection, ModelManager};
use crate::payment::{PaymentGateway, SnapGateway};
use crate::utils::signal::shutdown_signal;
use crate::web::AppState;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod payment;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "lernly";

/// Loads the configuration, migrates the database and wires the live payment gateway.
pub async fn build_server() -> AppResult<(AppState, Router)> {
    let config = Config::load(cfg!(debug_assertions))?;
    let db = DbConnection::connect(config.app().database_uri())?;
    db.migrate(Path::new("./migrations")).await?;

    let gateway = SnapGateway::new(config.payment().server_key(), config.payment().snap_url())?;
    build_server_with(db, config, Arc::new(gateway))
}

/// Builds the router on top of an existing connection. Tests use this to
/// inject a throwaway database and a stub gateway.
pub fn build_server_with(
    db: DbConnection,
    config: Config,
    gateway: Arc<dyn PaymentGateway>,
) -> AppResult<(AppState, Router)> {
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, Arc::new(config), gateway);
    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let bindto = state.config().host().bindto().to_string();
    let listener = TcpListener::bind(&bindto).await?;

    tracing::info!("{APPLICATION_NAME} is starting at: {bindto}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
