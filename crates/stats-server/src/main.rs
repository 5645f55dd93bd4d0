//! # readme-stats server
//!
//! Main entry point. Loads configuration, initializes logging and runs the
//! HTTP server until SIGTERM or SIGINT. Exits 0 after a graceful shutdown and
//! 1 when the shutdown deadline fires or the server fails.

use stats_config::ConfigLoader;
use stats_core::init_telemetry;
use stats_server::{run, startup};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location().load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    startup::print_banner();
    startup::print_startup_info(&config);

    match run(config).await {
        Ok(outcome) => {
            info!(exit_code = outcome.exit_code(), "Server stopped: {:?}", outcome);
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!("Application error: {}", e);
            std::process::exit(1);
        }
    }
}
