//! In-process repository
//!
//! Nothing survives a restart. Used by tests and by `storage.backend = "memory"`.

use super::{new_id, ReportRepository};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::zone::Zone;
use tokio::sync::RwLock;

/// Repository keeping reports in memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    reports: RwLock<Vec<Report>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with already persisted reports (ids are kept as given)
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: RwLock::new(reports),
        }
    }
}

impl ReportRepository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, report: &Report) -> Result<String> {
        let id = new_id();
        let mut stored = report.clone();
        stored.id = id.clone();
        self.reports.write().await.push(stored);
        Ok(id)
    }

    async fn update_zone(&self, id: &str, zone: Zone) -> Result<()> {
        let mut reports = self.reports.write().await;
        let report = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::Repository(format!("No report with id {}", id)))?;
        report.zone = zone;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Report>> {
        Ok(self.reports.read().await.clone())
    }
}
