//! Query command handlers
//!
//! nearby, red-zones, zone and types.

use super::{open_service, PointArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, Listing};
use crate::report::available_types;
use crate::service::NearbyOrder;
use crate::zone::Zone;
use clap::Args;
use std::str::FromStr;

/// Nearby command arguments
#[derive(Args)]
pub struct NearbyArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Search radius in meters (default from config)
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Maximum number of reports (default from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Sort order: distance or recent
    #[arg(long, default_value = "distance")]
    pub order: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Red-zones command arguments
#[derive(Args)]
pub struct RedZonesArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Maximum number of reports (default from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Least severe zone to include (default from config)
    #[arg(long)]
    pub min_zone: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Zone command arguments
#[derive(Args)]
pub struct ZoneArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Print the assessment as JSON
    #[arg(long)]
    pub json: bool,
}

/// Output selection shared by listing commands
#[derive(Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

impl OutputArgs {
    /// Render and print (or write) a listing
    fn emit(&self, listing: &Listing) -> Result<()> {
        let formatter = get_formatter(&self.format)
            .ok_or_else(|| Error::Validation(format!("Unknown format: {}", self.format)))?;
        let output = formatter.format(listing)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &output)?;
                println!("Wrote {} reports to {}", listing.reports.len(), path);
            }
            None => print!("{}", output),
        }
        Ok(())
    }

    /// Print the format list if requested; true when the command should stop
    fn handle_list_formats(&self) -> bool {
        if self.list_formats {
            println!("Available formats:");
            for info in available_formats() {
                println!("  {:<8} {}", info.name, info.description);
            }
        }
        self.list_formats
    }
}

/// Run the nearby command
pub async fn run_nearby(args: NearbyArgs) -> Result<()> {
    if args.output.handle_list_formats() {
        return Ok(());
    }

    let center = args.point.point()?;
    let order = NearbyOrder::from_str(&args.order).map_err(Error::Validation)?;

    let config = Config::load()?;
    let radius = args.radius.unwrap_or(config.query.nearby_radius_meters);
    let limit = args.limit.unwrap_or(config.query.nearby_limit);

    let service = open_service(&config).await?;
    let hits = service.query_nearby_ordered(center, radius, limit, order)?;

    args.output
        .emit(&Listing::new("nearby", center, Some(radius), hits))
}

/// Run the red-zones command
pub async fn run_red_zones(args: RedZonesArgs) -> Result<()> {
    if args.output.handle_list_formats() {
        return Ok(());
    }

    let center = args.point.point()?;
    let config = Config::load()?;
    let min_zone = match &args.min_zone {
        Some(zone) => Zone::from_str(zone).map_err(Error::Validation)?,
        None => config.red_zone_min_zone()?,
    };
    let limit = args.limit.unwrap_or(config.query.red_zone_limit);

    let service = open_service(&config).await?;
    let hits = service.query_red_zones(center, limit, min_zone);

    args.output.emit(&Listing::new(
        format!("{}+ zone", min_zone),
        center,
        config.query.red_zone_max_distance_meters,
        hits,
    ))
}

/// Run the zone command
pub async fn run_zone(args: ZoneArgs) -> Result<()> {
    let location = args.point.point()?;
    let config = Config::load()?;
    let service = open_service(&config).await?;
    let assessment = service.assess(location);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        println!("Location: {}", assessment.location);
        println!(
            "Reports within {}m: {}",
            assessment.radius_meters, assessment.count
        );
        println!("Zone: {}", assessment.zone);
    }
    Ok(())
}

/// Run the types command
pub fn run_types() -> Result<()> {
    println!("Disaster types:");
    for name in available_types() {
        println!("  {}", name);
    }
    Ok(())
}
