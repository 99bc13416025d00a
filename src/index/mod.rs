//! Spatial indexes over reports
//!
//! This module defines the `SpatialIndex` trait and its implementations. Each
//! index owns its reports behind a single read-write lock: queries run
//! concurrently, inserts and zone updates are exclusive.
//!
//! ## Flex Point
//! Adding a new index requires:
//! 1. Create `src/index/{name}.rs` implementing `SpatialIndex`
//! 2. Add `pub mod {name};` below
//! 3. Register it in `get_index` and `available_indexes`

pub mod rtree;
pub mod scan;

use crate::coord::GeoPoint;
use crate::report::Report;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Position of a report inside an index (its insertion sequence number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexHandle(usize);

impl IndexHandle {
    pub fn sequence(&self) -> usize {
        self.0
    }
}

/// A query hit annotated with its great-circle distance from the query point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    #[serde(flatten)]
    pub report: Report,
    pub distance_meters: f64,
}

/// Trait for spatial indexes
///
/// Implementations must be thread-safe (Send + Sync); one instance is shared
/// by every request handler.
pub trait SpatialIndex: Send + Sync {
    /// Returns the index name (e.g., "rtree", "scan")
    fn name(&self) -> &'static str;

    /// Add a report; duplicates at the same location are kept
    fn insert(&self, report: Report) -> IndexHandle;

    /// Replace the zone of an indexed report
    ///
    /// Returns false if the handle is unknown.
    fn set_zone(&self, handle: IndexHandle, zone: Zone) -> bool;

    /// Copy of the report behind a handle
    fn get(&self, handle: IndexHandle) -> Option<Report>;

    /// Every report within `radius_meters` (inclusive) of `center`, unordered
    fn radius_search(&self, center: GeoPoint, radius_meters: f64) -> Vec<Report>;

    /// Number of reports `radius_search` would return, without collecting them
    fn count(&self, center: GeoPoint, radius_meters: f64) -> usize;

    /// Up to `k` reports accepted by `filter`, nearest first
    ///
    /// Reports at equal distance come back in insertion order.
    fn k_nearest_where(
        &self,
        center: GeoPoint,
        k: usize,
        max_distance_meters: Option<f64>,
        filter: &dyn Fn(&Report) -> bool,
    ) -> Vec<Neighbor>;

    /// Up to `k` reports, nearest first
    fn k_nearest(
        &self,
        center: GeoPoint,
        k: usize,
        max_distance_meters: Option<f64>,
    ) -> Vec<Neighbor> {
        self.k_nearest_where(center, k, max_distance_meters, &|_| true)
    }

    /// All reports with their handles, in insertion order
    fn snapshot(&self) -> Vec<(IndexHandle, Report)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Information about an index implementation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub description: String,
}

/// Get an index by name
///
/// Returns the R-tree index as default if name is not recognized
pub fn get_index(name: &str) -> Box<dyn SpatialIndex> {
    match name {
        "scan" => Box::new(scan::ScanIndex::new()),
        _ => Box::new(rtree::RTreeIndex::new()),
    }
}

/// List all available indexes with their info
pub fn available_indexes() -> Vec<IndexInfo> {
    vec![
        IndexInfo {
            name: "rtree".to_string(),
            description: "R-tree over unit-sphere positions (sub-linear queries)".to_string(),
        },
        IndexInfo {
            name: "scan".to_string(),
            description: "Linear scan (reference implementation)".to_string(),
        },
    ]
}

/// Radii that can match anything; negative and NaN match nothing
fn is_searchable(radius_meters: f64) -> bool {
    radius_meters >= 0.0
}

/// Order hits by (distance, insertion sequence) and keep the first `k`
fn finish_nearest(mut hits: Vec<(usize, Neighbor)>, k: usize) -> Vec<Neighbor> {
    hits.sort_by(|(seq_a, a), (seq_b, b)| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then(seq_a.cmp(seq_b))
    });
    hits.truncate(k);
    hits.into_iter().map(|(_, neighbor)| neighbor).collect()
}

// Every write leaves the index consistent, so a poisoned lock is still usable
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
