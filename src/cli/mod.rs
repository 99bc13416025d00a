//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions. Commands other
//! than `serve` and `status` work directly on the configured storage.

pub mod config;
pub mod ingest;
pub mod query;
pub mod serve;
pub mod status;

use crate::config::Config;
use crate::coord::GeoPoint;
use crate::error::Result;
use crate::index::{get_index, SpatialIndex};
use crate::service::{AggregationService, ServiceSettings};
use crate::store::Store;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Disaster report aggregation and risk zones
#[derive(Parser)]
#[command(name = "disaster-zones")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Submit a single report
    Ingest(ingest::IngestArgs),

    /// Scatter synthetic reports around a point
    Seed(ingest::SeedArgs),

    /// List reports near a point
    Nearby(query::NearbyArgs),

    /// List the nearest high-risk reports
    RedZones(query::RedZonesArgs),

    /// Show density and zone at a point
    Zone(query::ZoneArgs),

    /// List disaster types
    Types,

    /// Recompute every stored report's zone
    Reclassify,

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show server/storage status
    Status(status::StatusArgs),
}

/// A point given on the command line
#[derive(Args, Debug, Clone, Copy)]
pub struct PointArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, visible_alias = "lng", allow_negative_numbers = true)]
    pub lon: f64,
}

impl PointArgs {
    pub fn point(&self) -> Result<GeoPoint> {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Ingest(args) => ingest::run_ingest(args).await,
        Commands::Seed(args) => ingest::run_seed(args).await,
        Commands::Nearby(args) => query::run_nearby(args).await,
        Commands::RedZones(args) => query::run_red_zones(args).await,
        Commands::Zone(args) => query::run_zone(args).await,
        Commands::Types => query::run_types(),
        Commands::Reclassify => ingest::run_reclassify().await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}

/// Install the tracing subscriber (RUST_LOG overrides the default "info")
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Open the configured storage and rebuild the index from it
pub(crate) async fn open_service(config: &Config) -> Result<AggregationService<Store>> {
    let index: Arc<dyn SpatialIndex> = Arc::from(get_index(&config.index.backend));
    let store = Store::from_config(&config.storage)?;
    AggregationService::open(index, store, ServiceSettings::from_config(config)?).await
}
