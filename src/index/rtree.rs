//! R-tree index over unit-sphere positions
//!
//! Each report is stored as its 3D unit vector. On the sphere the straight
//! chord between two points grows monotonically with their great-circle
//! distance, so "within R meters" is exactly "within chord(R)" in 3D. That
//! turns radius and nearest queries into plain Euclidean R-tree queries with
//! no antimeridian or pole special cases. Candidates are re-checked with the
//! haversine formula so boundaries and reported distances match it exactly.

use super::{finish_nearest, is_searchable, read_lock, write_lock, IndexHandle, Neighbor, SpatialIndex};
use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::distance::{chord_squared, haversine_distance, unit_vector};
use crate::coord::GeoPoint;
use crate::report::Report;
use crate::zone::Zone;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::f64::consts::PI;
use std::sync::RwLock;

/// Relative widening of the chord bound, absorbs rounding in the projection
const CHORD_SLACK: f64 = 1e-6;

/// Absolute widening, keeps zero-radius queries matching coincident points
const CHORD_FLOOR: f64 = 1e-18;

/// First ring searched by nearest queries
const INITIAL_SEARCH_RADIUS_METERS: f64 = 1_000.0;

/// Growth factor between nearest-query rings
const SEARCH_GROWTH: f64 = 4.0;

type Entry = GeomWithData<[f64; 3], usize>;

struct Inner {
    tree: RTree<Entry>,
    /// Reports by handle
    reports: Vec<Report>,
}

/// R-tree backed spatial index
pub struct RTreeIndex {
    inner: RwLock<Inner>,
}

impl RTreeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tree: RTree::new(),
                reports: Vec::new(),
            }),
        }
    }

    /// Build an index from existing reports in one pass
    ///
    /// Handles follow the order of `reports`.
    pub fn bulk_load(reports: Vec<Report>) -> Self {
        let entries = reports
            .iter()
            .enumerate()
            .map(|(seq, r)| GeomWithData::new(unit_vector(r.location), seq))
            .collect();

        Self {
            inner: RwLock::new(Inner {
                tree: RTree::bulk_load(entries),
                reports,
            }),
        }
    }
}

impl Default for RTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Squared chord bound covering every point within `radius_meters`
fn chord_bound(radius_meters: f64) -> f64 {
    chord_squared(radius_meters) * (1.0 + CHORD_SLACK) + CHORD_FLOOR
}

impl Inner {
    /// Reports within the radius together with their handle and distance
    fn within(&self, center: GeoPoint, radius_meters: f64) -> impl Iterator<Item = (usize, &Report, f64)> + '_ {
        self.tree
            .locate_within_distance(unit_vector(center), chord_bound(radius_meters))
            .filter_map(move |entry| {
                let report = &self.reports[entry.data];
                let distance = haversine_distance(center, report.location);
                (distance <= radius_meters).then_some((entry.data, report, distance))
            })
    }
}

impl SpatialIndex for RTreeIndex {
    fn name(&self) -> &'static str {
        "rtree"
    }

    fn insert(&self, report: Report) -> IndexHandle {
        let position = unit_vector(report.location);
        let mut inner = write_lock(&self.inner);
        let seq = inner.reports.len();
        inner.reports.push(report);
        inner.tree.insert(GeomWithData::new(position, seq));
        IndexHandle(seq)
    }

    fn set_zone(&self, handle: IndexHandle, zone: Zone) -> bool {
        let mut inner = write_lock(&self.inner);
        match inner.reports.get_mut(handle.0) {
            Some(report) => {
                report.zone = zone;
                true
            }
            None => false,
        }
    }

    fn get(&self, handle: IndexHandle) -> Option<Report> {
        read_lock(&self.inner).reports.get(handle.0).cloned()
    }

    fn radius_search(&self, center: GeoPoint, radius_meters: f64) -> Vec<Report> {
        if !is_searchable(radius_meters) {
            return Vec::new();
        }
        let inner = read_lock(&self.inner);
        inner
            .within(center, radius_meters)
            .map(|(_, report, _)| report.clone())
            .collect()
    }

    fn count(&self, center: GeoPoint, radius_meters: f64) -> usize {
        if !is_searchable(radius_meters) {
            return 0;
        }
        read_lock(&self.inner).within(center, radius_meters).count()
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

        let whole_sphere = PI * EARTH_RADIUS_METERS;
        let inner = read_lock(&self.inner);
        let mut radius = INITIAL_SEARCH_RADIUS_METERS.min(limit);

        // Grow the ring until it holds k accepted hits; everything outside a
        // ring is farther than everything inside it
        loop {
            let hits: Vec<(usize, Neighbor)> = inner
                .within(center, radius)
                .filter(|(_, report, _)| filter(report))
                .map(|(seq, report, distance)| {
                    (
                        seq,
                        Neighbor {
                            report: report.clone(),
                            distance_meters: distance,
                        },
                    )
                })
                .collect();

            if hits.len() >= k || radius >= limit || radius >= whole_sphere {
                return finish_nearest(hits, k);
            }
            radius = (radius * SEARCH_GROWTH).min(limit);
        }
    }

    fn snapshot(&self) -> Vec<(IndexHandle, Report)> {
        read_lock(&self.inner)
            .reports
            .iter()
            .enumerate()
            .map(|(seq, report)| (IndexHandle(seq), report.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        read_lock(&self.inner).reports.len()
    }
}
