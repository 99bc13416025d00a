//! Serve command handler
//!
//! Runs the HTTP API in the foreground until Ctrl-C.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides server.port)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Storage backend for this run: "file" or "memory"
    #[arg(long)]
    pub storage: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    config.server.host = args.host.unwrap_or(config.server.host);
    config.server.port = args.port.unwrap_or(config.server.port);
    if let Some(storage) = args.storage {
        config.storage.backend = storage;
    }
    config.validate()?;

    info!(
        "disaster-zones v{}: {} storage, {} index, zones at >{}/>{}/>{} reports within {}m",
        env!("CARGO_PKG_VERSION"),
        config.storage.backend,
        config.index.backend,
        config.zones.yellow_above,
        config.zones.orange_above,
        config.zones.red_above,
        config.zones.radius_meters
    );

    server::run(config).await
}
