//! Output formatters
//!
//! Provides trait-based output formatting for query results.

pub mod geojson;
pub mod json;
pub mod text;

use crate::coord::GeoPoint;
use crate::error::Result;
use crate::index::Neighbor;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// A query result ready for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Short description of the query ("nearby", "red zones", ...)
    pub query: String,
    pub center: GeoPoint,
    /// Search radius, if the query had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
    pub reports: Vec<Neighbor>,
}

impl Listing {
    pub fn new(query: impl Into<String>, center: GeoPoint, radius_meters: Option<f64>, reports: Vec<Neighbor>) -> Self {
        Self {
            query: query.into(),
            center,
            radius_meters,
            reports,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Render a listing
    fn format(&self, listing: &Listing) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "geojson" => Some(Box::new(geojson::GeoJsonFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Full JSON listing".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable text".to_string(),
        },
        FormatInfo {
            name: "geojson".to_string(),
            description: "GeoJSON FeatureCollection of points".to_string(),
        },
    ]
}
