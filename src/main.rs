//! disaster-zones CLI entry point
//!
//! Disaster report aggregation and risk zones - CLI + web API

use disaster_zones::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
