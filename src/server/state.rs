//! Server shared state
//!
//! Holds configuration and the aggregation service for the HTTP server.

use crate::config::Config;
use crate::error::Result;
use crate::index::{get_index, SpatialIndex};
use crate::service::{AggregationService, ServiceSettings};
use crate::store::Store;
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration the server was started with
    pub config: Config,

    /// Ingestion and queries
    pub service: AggregationService<Store>,

    started: Instant,
}

impl AppState {
    /// Open the configured repository and rebuild the index from it
    pub async fn open(config: Config) -> Result<Self> {
        let index: Arc<dyn SpatialIndex> = Arc::from(get_index(&config.index.backend));
        let store = Store::from_config(&config.storage)?;
        let settings = ServiceSettings::from_config(&config)?;
        let service = AggregationService::open(index, store, settings).await?;
        Ok(Self::with_service(config, service))
    }

    /// Wrap an already constructed service
    pub fn with_service(config: Config, service: AggregationService<Store>) -> Self {
        Self {
            config,
            service,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
