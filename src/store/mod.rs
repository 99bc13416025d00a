//! Report repositories
//!
//! The aggregation service persists reports through the `ReportRepository`
//! trait. The repository assigns ids and owns durability; the spatial index is
//! rebuilt from `load_all` on startup.

pub mod file;
pub mod memory;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::report::Report;
use crate::zone::Zone;
use std::future::Future;

/// Trait for report storage backends
pub trait ReportRepository: Send + Sync {
    /// Returns the backend name (e.g., "memory", "file")
    fn name(&self) -> &'static str;

    /// Persist a new report and return the id assigned to it
    ///
    /// The `id` field of the argument is ignored.
    fn insert(&self, report: &Report) -> impl Future<Output = Result<String>> + Send;

    /// Record a new zone for an already persisted report
    fn update_zone(&self, id: &str, zone: Zone) -> impl Future<Output = Result<()>> + Send;

    /// Every stored report, oldest first
    fn load_all(&self) -> impl Future<Output = Result<Vec<Report>>> + Send;
}

/// Storage backend selected by configuration
pub enum Store {
    Memory(memory::MemoryRepository),
    File(file::JsonFileRepository),
}

impl Store {
    /// Open the backend named in the storage config
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.backend.as_str() {
            "memory" => Ok(Store::Memory(memory::MemoryRepository::new())),
            "file" => {
                let repo = match &config.path {
                    Some(path) => file::JsonFileRepository::open(path.into())?,
                    None => file::JsonFileRepository::open_default()?,
                };
                Ok(Store::File(repo))
            }
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl ReportRepository for Store {
    fn name(&self) -> &'static str {
        match self {
            Store::Memory(repo) => repo.name(),
            Store::File(repo) => repo.name(),
        }
    }

    async fn insert(&self, report: &Report) -> Result<String> {
        match self {
            Store::Memory(repo) => repo.insert(report).await,
            Store::File(repo) => repo.insert(report).await,
        }
    }

    async fn update_zone(&self, id: &str, zone: Zone) -> Result<()> {
        match self {
            Store::Memory(repo) => repo.update_zone(id, zone).await,
            Store::File(repo) => repo.update_zone(id, zone).await,
        }
    }

    async fn load_all(&self) -> Result<Vec<Report>> {
        match self {
            Store::Memory(repo) => repo.load_all().await,
            Store::File(repo) => repo.load_all().await,
        }
    }
}

/// Names of the available storage backends
pub fn available_backends() -> Vec<&'static str> {
    vec!["file", "memory"]
}

/// Fresh repository id
fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
