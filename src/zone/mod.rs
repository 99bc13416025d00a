//! Density-based zone classification
//!
//! A zone is derived from the number of reports within the classification
//! radius of a point. Thresholds are exclusive lower bounds: a count equal to
//! a threshold stays in the lower zone.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Risk zone, ordered by severity (green < yellow < orange < red)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[default]
    Green,
    Yellow,
    Orange,
    Red,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "orange" => Ok(Self::Orange),
            "red" => Ok(Self::Red),
            _ => Err(format!("Unknown zone: {}", s)),
        }
    }
}

/// Count thresholds; a count strictly above a threshold reaches that zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub yellow_above: usize,
    pub orange_above: usize,
    pub red_above: usize,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            yellow_above: 10,
            orange_above: 30,
            red_above: 50,
        }
    }
}

impl ZoneThresholds {
    /// Build thresholds, requiring them to be strictly increasing
    pub fn new(yellow_above: usize, orange_above: usize, red_above: usize) -> Result<Self> {
        let thresholds = Self {
            yellow_above,
            orange_above,
            red_above,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.yellow_above < self.orange_above && self.orange_above < self.red_above {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Zone thresholds must be strictly increasing (yellow {} < orange {} < red {})",
                self.yellow_above, self.orange_above, self.red_above
            )))
        }
    }

    /// Map a density count to its zone
    pub fn classify(&self, count: usize) -> Zone {
        if count > self.red_above {
            Zone::Red
        } else if count > self.orange_above {
            Zone::Orange
        } else if count > self.yellow_above {
            Zone::Yellow
        } else {
            Zone::Green
        }
    }
}

/// Thresholds plus the radius over which density is counted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneClassifier {
    thresholds: ZoneThresholds,
    radius_meters: f64,
}

impl Default for ZoneClassifier {
    fn default() -> Self {
        Self {
            thresholds: ZoneThresholds::default(),
            radius_meters: crate::config::defaults::DEFAULT_CLASSIFICATION_RADIUS,
        }
    }
}

impl ZoneClassifier {
    pub fn new(thresholds: ZoneThresholds, radius_meters: f64) -> Result<Self> {
        thresholds.validate()?;
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(Error::InvalidRadius(format!(
                "Classification radius must be positive, got {}",
                radius_meters
            )));
        }
        Ok(Self {
            thresholds,
            radius_meters,
        })
    }

    pub fn classify(&self, count: usize) -> Zone {
        self.thresholds.classify(count)
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}
