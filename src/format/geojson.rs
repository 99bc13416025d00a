//! GeoJSON output formatter
//!
//! One Point feature per report. GeoJSON positions are `[longitude, latitude]`.

use crate::error::Result;
use crate::format::{Listing, OutputFormatter};
use serde_json::{json, Value};

/// GeoJSON formatter - outputs a FeatureCollection for map tools
pub struct GeoJsonFormatter;

impl OutputFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "GeoJSON FeatureCollection of points"
    }

    fn format(&self, listing: &Listing) -> Result<String> {
        let features: Vec<Value> = listing
            .reports
            .iter()
            .map(|neighbor| {
                let report = &neighbor.report;
                json!({
                    "type": "Feature",
                    "id": report.id,
                    "geometry": {
                        "type": "Point",
                        "coordinates": [report.location.lon(), report.location.lat()],
                    },
                    "properties": {
                        "disaster_type": report.disaster_type,
                        "description": report.description,
                        "image_ref": report.image_ref,
                        "created_at": report.created_at,
                        "zone": report.zone,
                        "distance_meters": neighbor.distance_meters,
                    },
                })
            })
            .collect();

        let collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        Ok(serde_json::to_string_pretty(&collection)?)
    }
}
