//! Ingest, seed and reclassify command handlers
//!
//! These write to the configured storage directly, without a running server.

use super::{open_service, PointArgs};
use crate::config::Config;
use crate::coord::point::generate_points_in_circle;
use crate::error::{Error, Result};
use crate::report::{DisasterType, NewReport};
use crate::zone::Zone;
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Ingest command arguments
#[derive(Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Disaster type (see `types`)
    #[arg(long, short = 't')]
    pub r#type: String,

    /// Free-text description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Reference to the uploaded image
    #[arg(long, short = 'i')]
    pub image: String,

    /// Print the stored report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Seed command arguments
#[derive(Args)]
pub struct SeedArgs {
    #[command(flatten)]
    pub center: PointArgs,

    /// Scatter radius in meters
    #[arg(long, short = 'r', default_value = "1000")]
    pub radius: f64,

    /// Number of reports to create
    #[arg(long, short = 'n', default_value = "50")]
    pub count: usize,

    /// Disaster type (random when omitted)
    #[arg(long, short = 't')]
    pub r#type: Option<String>,

    /// Seed for reproducible placement
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the ingest command
pub async fn run_ingest(args: IngestArgs) -> Result<()> {
    let config = Config::load()?;
    let service = open_service(&config).await?;

    let input = NewReport::new(
        args.point.lat,
        args.point.lon,
        args.r#type,
        args.description,
        args.image,
    );
    let report = service.ingest(input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stored {} report {}", report.disaster_type, report.id);
        println!("  Location: {}", report.location);
        println!("  Zone: {}", report.zone);
    }
    Ok(())
}

/// Run the seed command
pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let center = args.center.point()?;
    if !args.radius.is_finite() || args.radius <= 0.0 {
        return Err(Error::InvalidRadius(format!(
            "Seed radius must be positive, got {}",
            args.radius
        )));
    }
    let fixed_type = args.r#type.as_deref().map(DisasterType::from_str).transpose()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let inputs: Vec<NewReport> = generate_points_in_circle(center, args.radius, args.count, &mut rng)
        .into_iter()
        .enumerate()
        .map(|(i, point)| {
            let disaster_type = fixed_type
                .unwrap_or_else(|| DisasterType::ALL[rng.gen_range(0..DisasterType::ALL.len())]);
            NewReport::new(
                point.lat(),
                point.lon(),
                disaster_type.as_str(),
                format!("Synthetic report {}", i + 1),
                format!("seed://{}", i + 1),
            )
        })
        .collect();

    let config = Config::load()?;
    let service = open_service(&config).await?;

    let mut zones: BTreeMap<Zone, usize> = BTreeMap::new();
    for input in inputs {
        let report = service.ingest(input).await?;
        *zones.entry(report.zone).or_default() += 1;
    }

    println!(
        "Seeded {} reports within {}m of {}",
        args.count, args.radius, center
    );
    for (zone, count) in zones {
        println!("  {:<7} {}", zone.as_str(), count);
    }
    Ok(())
}

/// Run the reclassify command
pub async fn run_reclassify() -> Result<()> {
    let config = Config::load()?;
    let service = open_service(&config).await?;
    let summary = service.reclassify_all().await?;

    println!(
        "Examined {} reports, {} changed zone",
        summary.examined, summary.changed
    );
    Ok(())
}
