//! Status command handler
//!
//! Shows server status and local storage statistics.

use crate::config::Config;
use crate::error::Result;
use crate::index::available_indexes;
use crate::store::{available_backends, ReportRepository, Store};
use crate::zone::Zone;
use clap::Args;
use std::collections::BTreeMap;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,

    /// List available storage backends and indexes
    #[arg(long)]
    pub backends: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    println!("disaster-zones v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Check server status if requested
    if args.server {
        check_server_status(&config).await;
    }

    if args.backends {
        println!("Storage backends: {}", available_backends().join(", "));
        println!("Indexes:");
        for info in available_indexes() {
            println!("  {:<6} {}", info.name, info.description);
        }
        println!();
    }

    let store = Store::from_config(&config.storage)?;
    let reports = store.load_all().await?;

    println!("Storage: {}", store.name());
    if let Store::File(repo) = &store {
        println!("  Path: {}", repo.path().display());
    }
    println!("  Reports: {}", reports.len());

    let mut zones: BTreeMap<Zone, usize> = BTreeMap::new();
    for report in &reports {
        *zones.entry(report.zone).or_default() += 1;
    }
    for (zone, count) in zones.iter().rev() {
        println!("    {:<7} {}", zone.as_str(), count);
    }

    if let Some(latest) = reports.iter().map(|r| r.created_at).max() {
        println!("  Latest: {}", latest.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                    if let Some(reports) = status.get("reports").and_then(|v| v.as_u64()) {
                        println!("  Reports: {}", reports);
                    }
                    if let Some(storage) = status.get("storage").and_then(|v| v.as_str()) {
                        println!("  Storage: {}", storage);
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
