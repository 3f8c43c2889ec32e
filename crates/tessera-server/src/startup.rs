//! Server startup utilities.

use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r"
  _______
 |__   __|
    | | ___  ___ ___  ___ _ __ __ _
    | |/ _ \/ __/ __|/ _ \ '__/ _` |
    | |  __/\__ \__ \  __/ | | (_| |
    |_|\___||___/___/\___|_|  \__,_|
    ");
}

/// Prints the endpoints the server is about to serve.
pub fn print_startup_info(addr: &str, metrics_path: Option<&str>) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/users", addr);
    info!("Health:    http://{}/health", addr);
    info!("Ready:     http://{}/ready", addr);
    info!("API Docs:  http://{}/api-docs/openapi.json", addr);
    if let Some(path) = metrics_path {
        info!("Metrics:   http://{}{}", addr, path);
    }
    info!("{}", separator);
}
