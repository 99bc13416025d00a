//! Report model
//!
//! A report is one observed disaster tied to a location. Everything except
//! `zone` is fixed once the report has been ingested.

use crate::coord::GeoPoint;
use crate::error::Error;
use crate::zone::Zone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of disaster categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisasterType {
    Flood,
    Earthquake,
    Landslide,
    Hurricane,
    Wildfire,
    Other,
}

impl DisasterType {
    /// Every category, in display order
    pub const ALL: [DisasterType; 6] = [
        DisasterType::Flood,
        DisasterType::Earthquake,
        DisasterType::Landslide,
        DisasterType::Hurricane,
        DisasterType::Wildfire,
        DisasterType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flood => "Flood",
            Self::Earthquake => "Earthquake",
            Self::Landslide => "Landslide",
            Self::Hurricane => "Hurricane",
            Self::Wildfire => "Wildfire",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisasterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownDisasterType(s.to_string()))
    }
}

/// Names of all disaster categories
pub fn available_types() -> Vec<&'static str> {
    DisasterType::ALL.iter().map(DisasterType::as_str).collect()
}

/// A persisted disaster report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Repository-assigned identifier; empty until persisted
    #[serde(default)]
    pub id: String,

    pub location: GeoPoint,

    pub disaster_type: DisasterType,

    #[serde(default)]
    pub description: String,

    /// Opaque reference to an externally stored image
    pub image_ref: String,

    pub created_at: DateTime<Utc>,

    /// Density classification at ingestion (or last sweep)
    #[serde(default)]
    pub zone: Zone,
}

impl Report {
    /// Create an unpersisted report with the default zone
    pub fn new(
        location: GeoPoint,
        disaster_type: DisasterType,
        description: impl Into<String>,
        image_ref: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            location,
            disaster_type,
            description: description.into(),
            image_ref: image_ref.into(),
            created_at,
            zone: Zone::default(),
        }
    }

    /// Whether the repository has assigned an id yet
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Raw ingestion input, validated by the aggregation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    pub disaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "image_url", alias = "imageUrl")]
    pub image_ref: String,
}

impl NewReport {
    pub fn new(
        lat: f64,
        lon: f64,
        disaster_type: impl Into<String>,
        description: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            lat,
            lon,
            disaster_type: disaster_type.into(),
            description: description.into(),
            image_ref: image_ref.into(),
        }
    }
}
