//! JSON file repository
//!
//! Stores all reports in a single pretty-printed JSON file in the XDG data
//! directory (~/.local/share/disaster-zones/reports.json). The whole file is
//! rewritten on every change, into a sibling temp file that is then renamed
//! over the original. The in-memory copy only changes after that rename
//! succeeded, so a failed or cancelled write leaves it as it was.

use super::{new_id, ReportRepository};
use crate::config::defaults::APP_DIR_NAME;
use crate::constants::storage::REPORTS_FILE_NAME;
use crate::error::{Error, Result};
use crate::report::Report;
use crate::zone::Zone;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// File-backed report repository
#[derive(Debug)]
pub struct JsonFileRepository {
    reports: Mutex<Vec<Report>>,
    path: PathBuf,
}

impl JsonFileRepository {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Get the default reports file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(REPORTS_FILE_NAME))
    }

    /// Open the repository at the default path
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the repository at a specific path
    ///
    /// A missing file is an empty repository; it is created on first write.
    pub fn open(path: PathBuf) -> Result<Self> {
        let reports = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Repository(format!("Failed to read reports file: {}", e))
            })?;

            serde_json::from_str(&content).map_err(|e| {
                Error::Repository(format!("Failed to parse reports file: {}", e))
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            reports: Mutex::new(reports),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh sibling path for one save; a write abandoned mid-flight can
    /// never land in the file a later save renames
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.tmp", new_id()));
        self.path.with_file_name(name)
    }

    async fn save(&self, reports: &[Report]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Repository(format!("Failed to create data directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(reports).map_err(|e| {
            Error::Repository(format!("Failed to serialize reports: {}", e))
        })?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, content).await.map_err(|e| {
            Error::Repository(format!("Failed to write reports file: {}", e))
        })?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Error::Repository(format!(
                "Failed to replace reports file: {}",
                e
            )));
        }

        debug!("Saved {} reports to {}", reports.len(), self.path.display());
        Ok(())
    }
}

impl ReportRepository for JsonFileRepository {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn insert(&self, report: &Report) -> Result<String> {
        let id = new_id();
        let mut stored = report.clone();
        stored.id = id.clone();

        let mut reports = self.reports.lock().await;
        let mut next = reports.clone();
        next.push(stored);
        self.save(&next).await?;
        *reports = next;
        Ok(id)
    }

    async fn update_zone(&self, id: &str, zone: Zone) -> Result<()> {
        let mut reports = self.reports.lock().await;
        let position = reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::Repository(format!("No report with id {}", id)))?;

        let mut next = reports.clone();
        next[position].zone = zone;
        self.save(&next).await?;
        *reports = next;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Report>> {
        Ok(self.reports.lock().await.clone())
    }
}
