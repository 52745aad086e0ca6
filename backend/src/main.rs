//! Backend entry-point: loads settings, migrates the database and serves the
//! listing pages.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, build_http_state, create_server, drain_on};
use wanderlust::inbound::http::health::HealthState;
use wanderlust::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use wanderlust::outbound::persistence::{DbPool, run_migrations};
use wanderlust::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::other(e.to_string()))?;
    let database_url = settings
        .database_url()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let session =
        session_settings_from_env(&DefaultEnv::default(), BuildMode::from_debug_assertions())
            .map_err(|e| io::Error::other(e.to_string()))?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");

    run_migrations(database_url)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;
    let pool_config = settings
        .pool_config()
        .map_err(|e| io::Error::other(e.to_string()))?;
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    let http_state = build_http_state(&settings, &pool)?;
    let config = ServerConfig::new(session, bind_addr, http_state);
    info!(addr = %config.bind_addr(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on(shutdown_signal(), health_state, server.handle()));
    server.await
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
