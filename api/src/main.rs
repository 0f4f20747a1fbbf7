use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pv_api::app::create_app;
use pv_api::state::{spawn_session_sweeper, AppState, SessionRegistry};
use pv_api::telemetry::init_tracing;
use pv_core::services::verification::VerificationServiceConfig;
use pv_infra::ChannelFactory;
use pv_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env when present)
    let config = AppConfig::from_env();

    init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        "Starting phone verification API server"
    );

    let channels = ChannelFactory::from_config(config.environment, &config.channels, &config.verification)
        .context("failed to configure verification channels")?;

    let sessions = Arc::new(SessionRegistry::new(
        Arc::new(channels),
        VerificationServiceConfig::from(&config.verification),
        Duration::from_secs(config.session.idle_ttl_seconds),
    ));
    spawn_session_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_seconds),
    );

    let app_state = web::Data::new(AppState::new(sessions, config.session.header_name.clone()));
    let cors = config.cors.clone();

    let bind_address = config.server.bind_address();
    info!(bind_address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &cors))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}
