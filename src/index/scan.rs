//! Linear-scan index
//!
//! Computes the haversine distance to every stored report on each query.
//! O(n) per call; kept as the reference the R-tree is checked against and for
//! very small deployments.

use super::{finish_nearest, is_searchable, read_lock, write_lock, IndexHandle, Neighbor, SpatialIndex};
use crate::coord::distance::{haversine_distance, is_in_circle};
use crate::coord::GeoPoint;
use crate::report::Report;
use crate::zone::Zone;
use std::sync::RwLock;

/// Full-scan spatial index
pub struct ScanIndex {
    reports: RwLock<Vec<Report>>,
}

impl ScanIndex {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
        }
    }
}

impl Default for ScanIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for ScanIndex {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn insert(&self, report: Report) -> IndexHandle {
        let mut reports = write_lock(&self.reports);
        reports.push(report);
        IndexHandle(reports.len() - 1)
    }

    fn set_zone(&self, handle: IndexHandle, zone: Zone) -> bool {
        match write_lock(&self.reports).get_mut(handle.0) {
            Some(report) => {
                report.zone = zone;
                true
            }
            None => false,
        }
    }

    fn get(&self, handle: IndexHandle) -> Option<Report> {
        read_lock(&self.reports).get(handle.0).cloned()
    }

    fn radius_search(&self, center: GeoPoint, radius_meters: f64) -> Vec<Report> {
        if !is_searchable(radius_meters) {
            return Vec::new();
        }
        read_lock(&self.reports)
            .iter()
            .filter(|r| is_in_circle(r.location, center, radius_meters))
            .cloned()
            .collect()
    }

    fn count(&self, center: GeoPoint, radius_meters: f64) -> usize {
        if !is_searchable(radius_meters) {
            return 0;
        }
        read_lock(&self.reports)
            .iter()
            .filter(|r| is_in_circle(r.location, center, radius_meters))
            .count()
    }

    fn k_nearest_where(
        &self,
        center: GeoPoint,
        k: usize,
        max_distance_meters: Option<f64>,
        filter: &dyn Fn(&Report) -> bool,
    ) -> Vec<Neighbor> {
        let limit = max_distance_meters.unwrap_or(f64::INFINITY);
        if k == 0 || !is_searchable(limit) {
            return Vec::new();
        }

        let hits = read_lock(&self.reports)
            .iter()
            .enumerate()
            .filter(|(_, r)| filter(r))
            .filter_map(|(seq, r)| {
                let distance = haversine_distance(center, r.location);
                (distance <= limit).then(|| {
                    (
                        seq,
                        Neighbor {
                            report: r.clone(),
                            distance_meters: distance,
                        },
                    )
                })
            })
            .collect();

        finish_nearest(hits, k)
    }

    fn snapshot(&self) -> Vec<(IndexHandle, Report)> {
        read_lock(&self.reports)
            .iter()
            .cloned()
            .enumerate()
            .map(|(seq, r)| (IndexHandle(seq), r))
            .collect()
    }

    fn len(&self) -> usize {
        read_lock(&self.reports).len()
    }
}
