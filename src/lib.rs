//! disaster-zones: Disaster Report Aggregation and Risk Zones
//!
//! A library and CLI tool that collects geolocated disaster reports, indexes
//! them spatially and classifies each report into a risk zone by the density
//! of reports around it.
//!
//! ## Features
//!
//! - Great-circle radius, count and k-nearest queries (R-tree or linear scan)
//! - Configurable density thresholds: green, yellow, orange, red
//! - Pluggable report storage (JSON file or in-memory)
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use disaster_zones::index::rtree::RTreeIndex;
//! use disaster_zones::report::NewReport;
//! use disaster_zones::service::{AggregationService, ServiceSettings};
//! use disaster_zones::store::memory::MemoryRepository;
//! use disaster_zones::GeoPoint;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = AggregationService::new(
//!     Arc::new(RTreeIndex::new()),
//!     MemoryRepository::new(),
//!     ServiceSettings::default(),
//! );
//!
//! let report = service
//!     .ingest(NewReport::new(14.5995, 120.9842, "Flood", "street under water", "/uploads/1.jpg"))
//!     .await
//!     .unwrap();
//! println!("Stored {} in the {} zone", report.id, report.zone);
//!
//! let here = GeoPoint::new(14.6, 120.98).unwrap();
//! let nearby = service.query_nearby(here, 1000.0, 10).unwrap();
//! assert_eq!(nearby.len(), 1);
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod index;
pub mod report;
pub mod server;
pub mod service;
pub mod store;
pub mod zone;

// Re-export commonly used types
pub use config::Config;
pub use coord::GeoPoint;
pub use error::{Error, Result};
pub use index::{Neighbor, SpatialIndex};
pub use report::{DisasterType, NewReport, Report};
pub use service::AggregationService;
pub use zone::{Zone, ZoneClassifier, ZoneThresholds};
