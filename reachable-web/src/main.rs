//! Reachability check web service.
//!
//! Wires configuration, logging and the probe engine behind an Actix-web
//! server. `GET /check?q=<host or url>` renders whether the host answers on
//! port 80 or 443.

mod config;
mod handlers;
mod logging;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use reachable_probe::{ProbeConfig, ReachabilityService};

use crate::config::Config;

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = logging::init(&config.log)?;

    let probe_config = ProbeConfig::default();
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        strategy = %config.probe.strategy,
        ports = ?probe_config.ports,
        deadline_secs = probe_config.deadline.as_secs(),
        "reachable-web starting"
    );

    let service = web::Data::new(ReachabilityService::with_strategy(
        config.probe.strategy,
        probe_config,
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(handlers::configure)
    })
    .workers(config.workers())
    .bind((config.server.host.as_str(), config.server.port))
    .with_context(|| {
        format!(
            "failed to bind {}:{}",
            config.server.host, config.server.port
        )
    })?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("reachable-web shut down");
    Ok(())
}
