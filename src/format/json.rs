//! JSON output formatter

use crate::error::Result;
use crate::format::{Listing, OutputFormatter};

/// JSON formatter - outputs the full listing as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON listing"
    }

    fn format(&self, listing: &Listing) -> Result<String> {
        Ok(serde_json::to_string_pretty(listing)?)
    }
}
