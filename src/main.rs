use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use sentry_api::configuration::Config;
use sentry_api::web_interface::{RateLimiter, WebServer};
use sentry_api::{CaptureService, FileStorage};

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
                 sentry-api v{} - Pi Sentry capture server
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    info!("Importing configuration");

    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Missing secrets are reported per request as 500s, not fatal here.
    if config.auth.ingest_secret.is_none() {
        warn!("API_KEY is not set, POST /capture will answer 500");
    }
    if config.auth.admin_secret.is_none() {
        warn!("ADMIN_API_KEY is not set, admin endpoints will answer 500");
    }
    info!("Configuration imported successfully");

    let storage = Arc::new(FileStorage::new(&config.captures_dir));
    let service = Arc::new(CaptureService::new(storage, config.auth.clone()));
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window,
    ));
    let server = WebServer::new(service, limiter, config.body_limit);

    let addr = SocketAddr::new(config.bind_address, config.port);
    if let Err(e) = server.start(addr).await {
        error!("Web server error: {}, exiting...", e);
        std::process::exit(1);
    }
}
