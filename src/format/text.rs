//! Human-readable text output formatter

use crate::error::Result;
use crate::format::{Listing, OutputFormatter};

/// Text formatter - outputs a human-readable table
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, listing: &Listing) -> Result<String> {
        let mut output = String::new();

        // Header
        output.push_str(&format!("disaster-zones {} query\n", listing.query));
        output.push_str(&format!("Center: {}\n", listing.center));
        if let Some(radius) = listing.radius_meters {
            output.push_str(&format!("Radius: {}m\n", radius));
        }
        output.push('\n');

        if listing.reports.is_empty() {
            output.push_str("No reports found.\n");
            return Ok(output);
        }

        output.push_str(&format!("Reports ({}):\n", listing.reports.len()));
        for neighbor in &listing.reports {
            let report = &neighbor.report;
            output.push_str(&format!(
                "  {:>8.1}m  {:<7} {:<11} {}  {}\n",
                neighbor.distance_meters,
                report.zone,
                report.disaster_type,
                report.location,
                report.created_at.format("%Y-%m-%d %H:%M UTC"),
            ));
            if !report.description.is_empty() {
                output.push_str(&format!("            {}\n", report.description));
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support::sample_listing;

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_listing()).unwrap();

        assert!(output.contains("nearby query"));
        assert!(output.contains("Center: (14.599500, 120.984200)"));
        assert!(output.contains("Radius: 1000m"));
        assert!(output.contains("Reports (2):"));
        assert!(output.contains("red"));
        assert!(output.contains("Wildfire"));
        assert!(output.contains("knee-deep water"));
        assert!(output.contains("2024-07-24 09:30 UTC"));
    }

    #[test]
    fn test_text_empty_listing() {
        let mut listing = sample_listing();
        listing.reports.clear();
        let output = TextFormatter.format(&listing).unwrap();
        assert!(output.contains("No reports found."));
    }

    #[test]
    fn test_text_formatter_info() {
        let formatter = TextFormatter;
        assert_eq!(formatter.name(), "text");
        assert!(!formatter.description().is_empty());
    }
}
