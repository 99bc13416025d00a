//! Aggregation service
//!
//! Orchestrates ingestion and queries over one shared spatial index, the zone
//! classifier and a report repository. This is the boundary the HTTP server
//! and the CLI talk to.
//!
//! Ingestion is not atomic: the density count of one `ingest` call includes
//! its own report and whatever concurrent reports reached the index first.

pub mod clock;

use crate::config::Config;
use crate::coord::GeoPoint;
use crate::error::{Error, Result};
use crate::index::{Neighbor, SpatialIndex};
use crate::report::{available_types, DisasterType, NewReport, Report};
use crate::store::ReportRepository;
use crate::zone::{Zone, ZoneClassifier};
use clock::MonotonicClock;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables the service needs from configuration
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub classifier: ZoneClassifier,
    pub max_description_chars: usize,
    /// Upper bound on every repository call
    pub repository_timeout: Duration,
    /// Radius cap of the red-zone query; unbounded when None
    pub red_zone_max_distance_meters: Option<f64>,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            classifier: config.classifier()?,
            max_description_chars: config.report.max_description_chars,
            repository_timeout: Duration::from_millis(config.storage.timeout_ms),
            red_zone_max_distance_meters: config.query.red_zone_max_distance_meters,
        })
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        use crate::config::defaults::*;

        Self {
            classifier: ZoneClassifier::default(),
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
            repository_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            red_zone_max_distance_meters: None,
        }
    }
}

/// Density and zone at an arbitrary point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAssessment {
    pub location: GeoPoint,
    /// Reports within `radius_meters` of `location`
    pub count: usize,
    pub zone: Zone,
    pub radius_meters: f64,
}

/// Outcome of a reclassification sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclassifySummary {
    pub examined: usize,
    pub changed: usize,
}

/// Result ordering for nearby queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearbyOrder {
    /// Nearest first
    #[default]
    Distance,
    /// Newest first, nearest first among equal timestamps
    Recent,
}

impl NearbyOrder {
    pub fn apply(&self, neighbors: &mut [Neighbor]) {
        if *self == NearbyOrder::Recent {
            neighbors.sort_by(|a, b| {
                b.report
                    .created_at
                    .cmp(&a.report.created_at)
                    .then(a.distance_meters.total_cmp(&b.distance_meters))
            });
        }
    }
}

impl FromStr for NearbyOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" | "nearest" => Ok(Self::Distance),
            "recent" | "recency" | "newest" => Ok(Self::Recent),
            _ => Err(format!("Unknown order: {}", s)),
        }
    }
}

/// Ingestion and query orchestration over index, classifier and repository
pub struct AggregationService<R> {
    index: Arc<dyn SpatialIndex>,
    repository: R,
    settings: ServiceSettings,
    clock: MonotonicClock,
}

impl<R: ReportRepository> AggregationService<R> {
    /// Create a service over an index and repository as they are
    pub fn new(index: Arc<dyn SpatialIndex>, repository: R, settings: ServiceSettings) -> Self {
        Self {
            index,
            repository,
            settings,
            clock: MonotonicClock::new(),
        }
    }

    /// Create a service and fill the index from everything the repository holds
    ///
    /// Stored zones are kept as they are; use `reclassify_all` to refresh them.
    pub async fn open(index: Arc<dyn SpatialIndex>, repository: R, settings: ServiceSettings) -> Result<Self> {
        let service = Self::new(index, repository, settings);
        let reports = service
            .bounded("load_all", service.repository.load_all())
            .await?;

        let loaded = reports.len();
        for report in reports {
            service.clock.observe(report.created_at);
            service.index.insert(report);
        }

        info!(
            "Loaded {} reports from {} repository into {} index",
            loaded,
            service.repository.name(),
            service.index.name()
        );
        Ok(service)
    }

    pub fn index(&self) -> &Arc<dyn SpatialIndex> {
        &self.index
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Validate and persist a new report, then classify it by local density
    ///
    /// The returned report carries its repository id and final zone. If the
    /// zone update cannot be persisted (or the call is dropped after the index
    /// insert) the report stays indexed with the default green zone.
    pub async fn ingest(&self, input: NewReport) -> Result<Report> {
        let (location, disaster_type) = self.validate(&input)?;

        let mut report = Report::new(
            location,
            disaster_type,
            input.description,
            input.image_ref,
            self.clock.now(),
        );

        let id = self
            .bounded("insert", self.repository.insert(&report))
            .await?;
        report.id = id;

        let handle = self.index.insert(report.clone());
        let count = self
            .index
            .count(location, self.settings.classifier.radius_meters());
        let zone = self.settings.classifier.classify(count);

        if zone != report.zone {
            self.bounded("update_zone", self.repository.update_zone(&report.id, zone))
                .await?;
            self.index.set_zone(handle, zone);
            report.zone = zone;
        }

        info!(
            "Ingested {} report {} at {} (density {}, zone {})",
            report.disaster_type, report.id, location, count, zone
        );
        Ok(report)
    }

    /// Reports within `radius_meters`, nearest first, at most `limit`
    pub fn query_nearby(&self, location: GeoPoint, radius_meters: f64, limit: usize) -> Result<Vec<Neighbor>> {
        self.query_nearby_ordered(location, radius_meters, limit, NearbyOrder::Distance)
    }

    /// Reports within `radius_meters`, the first `limit` in `order`
    ///
    /// With `Recent` the newest reports in the radius are kept, not the
    /// nearest ones re-sorted.
    pub fn query_nearby_ordered(
        &self,
        location: GeoPoint,
        radius_meters: f64,
        limit: usize,
        order: NearbyOrder,
    ) -> Result<Vec<Neighbor>> {
        check_radius(radius_meters)?;
        let hits = match order {
            NearbyOrder::Distance => self.index.k_nearest(location, limit, Some(radius_meters)),
            NearbyOrder::Recent => {
                let mut all = self.index.k_nearest(location, usize::MAX, Some(radius_meters));
                order.apply(&mut all);
                all.truncate(limit);
                all
            }
        };
        debug!(
            "Nearby query at {} within {}m returned {} reports",
            location,
            radius_meters,
            hits.len()
        );
        Ok(hits)
    }

    /// Reports classified at least `min_zone`, nearest first, at most `limit`
    pub fn query_red_zones(&self, location: GeoPoint, limit: usize, min_zone: Zone) -> Vec<Neighbor> {
        let hits = self.index.k_nearest_where(
            location,
            limit,
            self.settings.red_zone_max_distance_meters,
            &|report| report.zone >= min_zone,
        );
        debug!(
            "Zone query at {} (>= {}) returned {} reports",
            location,
            min_zone,
            hits.len()
        );
        hits
    }

    /// The closed list of disaster types
    pub fn list_disaster_types(&self) -> Vec<&'static str> {
        available_types()
    }

    /// Density and zone at a point, without ingesting anything
    pub fn assess(&self, location: GeoPoint) -> ZoneAssessment {
        let radius_meters = self.settings.classifier.radius_meters();
        let count = self.index.count(location, radius_meters);
        ZoneAssessment {
            location,
            count,
            zone: self.settings.classifier.classify(count),
            radius_meters,
        }
    }

    /// Recompute every report's zone against the current index
    ///
    /// Zones are persisted before they are published in the index; the sweep
    /// stops at the first repository failure.
    pub async fn reclassify_all(&self) -> Result<ReclassifySummary> {
        let radius = self.settings.classifier.radius_meters();
        let mut summary = ReclassifySummary::default();

        for (handle, report) in self.index.snapshot() {
            summary.examined += 1;
            let zone = self
                .settings
                .classifier
                .classify(self.index.count(report.location, radius));
            if zone == report.zone {
                continue;
            }

            self.bounded("update_zone", self.repository.update_zone(&report.id, zone))
                .await?;
            self.index.set_zone(handle, zone);
            summary.changed += 1;
        }

        info!(
            "Reclassified {} reports, {} changed zone",
            summary.examined, summary.changed
        );
        Ok(summary)
    }

    fn validate(&self, input: &NewReport) -> Result<(GeoPoint, DisasterType)> {
        let location = GeoPoint::new(input.lat, input.lon)?;
        let disaster_type = DisasterType::from_str(&input.disaster_type)?;

        let length = input.description.chars().count();
        if length > self.settings.max_description_chars {
            return Err(Error::Validation(format!(
                "Description is {} characters, the limit is {}",
                length, self.settings.max_description_chars
            )));
        }
        if input.image_ref.trim().is_empty() {
            return Err(Error::Validation("Image reference is required".to_string()));
        }

        Ok((location, disaster_type))
    }

    /// Run a repository call under the configured timeout
    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.settings.repository_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Repository {} failed: {}", operation, e);
                Err(e)
            }
            Err(_) => {
                warn!("Repository {} timed out after {:?}", operation, timeout);
                Err(Error::RepositoryTimeout(timeout.as_millis() as u64))
            }
        }
    }
}

fn check_radius(radius_meters: f64) -> Result<()> {
    if radius_meters.is_nan() || radius_meters < 0.0 {
        return Err(Error::InvalidRadius(format!(
            "Radius must be a non-negative number of meters, got {}",
            radius_meters
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::point::destination;
    use crate::index::rtree::RTreeIndex;
    use crate::store::file::JsonFileRepository;
    use crate::store::memory::MemoryRepository;
    use crate::zone::ZoneThresholds;
    use chrono::Utc;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn service() -> AggregationService<MemoryRepository> {
        AggregationService::new(
            Arc::new(RTreeIndex::new()),
            MemoryRepository::new(),
            ServiceSettings::default(),
        )
    }

    fn service_with_thresholds(yellow: usize, orange: usize, red: usize) -> AggregationService<MemoryRepository> {
        let settings = ServiceSettings {
            classifier: ZoneClassifier::new(ZoneThresholds::new(yellow, orange, red).unwrap(), 2000.0).unwrap(),
            ..ServiceSettings::default()
        };
        AggregationService::new(Arc::new(RTreeIndex::new()), MemoryRepository::new(), settings)
    }

    fn flood_at(location: GeoPoint) -> NewReport {
        NewReport::new(location.lat(), location.lon(), "Flood", "water rising", "/uploads/flood.jpg")
    }

    /// Repository that fails or stalls on demand
    struct FlakyRepository {
        inner: MemoryRepository,
        fail_insert: bool,
        fail_update: bool,
        delay: Option<Duration>,
    }

    impl FlakyRepository {
        fn new() -> Self {
            Self {
                inner: MemoryRepository::new(),
                fail_insert: false,
                fail_update: false,
                delay: None,
            }
        }
    }

    impl ReportRepository for FlakyRepository {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn insert(&self, report: &Report) -> Result<String> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_insert {
                return Err(Error::Repository("write rejected".to_string()));
            }
            self.inner.insert(report).await
        }

        async fn update_zone(&self, id: &str, zone: Zone) -> Result<()> {
            if self.fail_update {
                return Err(Error::Repository("write rejected".to_string()));
            }
            self.inner.update_zone(id, zone).await
        }

        async fn load_all(&self) -> Result<Vec<Report>> {
            self.inner.load_all().await
        }
    }

    fn flaky_service(repo: FlakyRepository, yellow_above: usize) -> AggregationService<FlakyRepository> {
        let settings = ServiceSettings {
            classifier: ZoneClassifier::new(
                ZoneThresholds::new(yellow_above, yellow_above + 1, yellow_above + 2).unwrap(),
                2000.0,
            )
            .unwrap(),
            repository_timeout: Duration::from_millis(50),
            ..ServiceSettings::default()
        };
        AggregationService::new(Arc::new(RTreeIndex::new()), repo, settings)
    }

    #[test]
    fn test_empty_queries() {
        let service = service();
        let here = pt(14.5995, 120.9842);

        assert!(service.query_nearby(here, 1000.0, 100).unwrap().is_empty());
        assert!(service.query_red_zones(here, 5, Zone::Red).is_empty());
        assert_eq!(service.assess(here).count, 0);
        assert_eq!(service.assess(here).zone, Zone::Green);
    }

    #[tokio::test]
    async fn test_single_report_counts_itself() {
        let service = service();
        let here = pt(14.5995, 120.9842);

        let report = service.ingest(flood_at(here)).await.unwrap();
        assert_eq!(report.zone, Zone::Green);
        assert!(report.is_persisted());
        assert_eq!(service.assess(here).count, 1);
    }

    #[tokio::test]
    async fn test_eleventh_report_is_yellow() {
        let service = service();
        let here = pt(-1.2921, 36.8219);

        for i in 1..=10 {
            let report = service.ingest(flood_at(here)).await.unwrap();
            assert_eq!(report.zone, Zone::Green, "report {}", i);
        }
        let eleventh = service.ingest(flood_at(here)).await.unwrap();
        assert_eq!(eleventh.zone, Zone::Yellow);

        // The persisted zone matches
        let stored = service.repository().load_all().await.unwrap();
        assert_eq!(stored.last().unwrap().zone, Zone::Yellow);
    }

    #[tokio::test]
    async fn test_threshold_boundaries_through_ingest() {
        let service = service();
        let here = pt(37.7749, -122.4194);

        let mut zones = Vec::new();
        for _ in 0..51 {
            zones.push(service.ingest(flood_at(here)).await.unwrap().zone);
        }

        assert_eq!(zones[29], Zone::Yellow); // count 30
        assert_eq!(zones[30], Zone::Orange); // count 31
        assert_eq!(zones[49], Zone::Orange); // count 50
        assert_eq!(zones[50], Zone::Red); // count 51
    }

    #[tokio::test]
    async fn test_classification_uses_its_own_radius() {
        let service = service();
        let here = pt(0.0, 0.0);

        // 1.5 km away: outside the 1 km query radius, inside the 2 km classification radius
        let away = destination(here, 90.0, 1_500.0);
        for _ in 0..10 {
            service.ingest(flood_at(away)).await.unwrap();
        }

        let report = service.ingest(flood_at(here)).await.unwrap();
        assert_eq!(report.zone, Zone::Yellow);
        assert_eq!(service.query_nearby(here, 1000.0, 100).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let service = service();
        let here = pt(28.6139, 77.2090);

        let input = NewReport::new(28.6139, 77.2090, "earthquake", "wall collapsed", "/uploads/wall.png");
        let ingested = service.ingest(input).await.unwrap();

        let hits = service.query_nearby(here, 1000.0, 100).unwrap();
        assert_eq!(hits.len(), 1);
        let found = &hits[0].report;
        assert_eq!(found, &ingested);
        assert_eq!(found.location, here);
        assert_eq!(found.disaster_type, DisasterType::Earthquake);
        assert_eq!(found.description, "wall collapsed");
        assert_eq!(found.image_ref, "/uploads/wall.png");
        assert!(hits[0].distance_meters < 1e-6);
    }

    #[tokio::test]
    async fn test_nearby_limit_and_order() {
        let service = service();
        let here = pt(52.52, 13.405);

        for meters in [90.0, 30.0, 60.0, 10.0, 2_000.0] {
            service
                .ingest(flood_at(destination(here, 45.0, meters)))
                .await
                .unwrap();
        }

        let hits = service.query_nearby(here, 1000.0, 3).unwrap();
        let distances: Vec<f64> = hits.iter().map(|n| n.distance_meters.round()).collect();
        assert_eq!(distances, vec![10.0, 30.0, 60.0]);

        assert_eq!(service.query_nearby(here, 1000.0, 100).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let service = service();

        let bad_lat = NewReport::new(95.0, 0.0, "Flood", "", "/uploads/a.jpg");
        assert!(matches!(service.ingest(bad_lat).await, Err(Error::InvalidCoordinates(_))));

        let bad_type = NewReport::new(0.0, 0.0, "Meteor", "", "/uploads/a.jpg");
        assert!(matches!(service.ingest(bad_type).await, Err(Error::UnknownDisasterType(_))));

        let long = NewReport::new(0.0, 0.0, "Flood", "x".repeat(2001), "/uploads/a.jpg");
        assert!(matches!(service.ingest(long).await, Err(Error::Validation(_))));

        let no_image = NewReport::new(0.0, 0.0, "Flood", "", "  ");
        assert!(matches!(service.ingest(no_image).await, Err(Error::Validation(_))));

        assert!(service.index().is_empty());
        assert!(service.repository().load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_description_at_limit_is_accepted() {
        let service = service();
        let input = NewReport::new(0.0, 0.0, "Other", "é".repeat(2000), "/uploads/a.jpg");
        assert!(service.ingest(input).await.is_ok());
    }

    #[test]
    fn test_invalid_query_radius() {
        let service = service();
        let here = pt(0.0, 0.0);
        assert!(matches!(service.query_nearby(here, -1.0, 10), Err(Error::InvalidRadius(_))));
        assert!(service.query_nearby(here, f64::NAN, 10).is_err());
    }

    #[tokio::test]
    async fn test_red_zones_nearest_first() {
        let service = service_with_thresholds(1, 2, 3);
        let hotspot_a = pt(10.0, 10.0);
        let hotspot_b = destination(hotspot_a, 0.0, 50_000.0);

        // Four reports at a spot: green, yellow, orange, red
        for spot in [hotspot_a, hotspot_b] {
            for _ in 0..4 {
                service.ingest(flood_at(spot)).await.unwrap();
            }
        }

        let probe = destination(hotspot_b, 0.0, 5_000.0);
        let red = service.query_red_zones(probe, 5, Zone::Red);
        assert_eq!(red.len(), 2);
        assert_eq!(red[0].report.location, hotspot_b);
        assert!(red.iter().all(|n| n.report.zone == Zone::Red));

        let severe = service.query_red_zones(probe, 10, Zone::Orange);
        assert_eq!(severe.len(), 4);

        assert_eq!(service.query_red_zones(probe, 1, Zone::Red).len(), 1);
    }

    #[tokio::test]
    async fn test_red_zone_radius_cap() {
        let mut service = service_with_thresholds(1, 2, 3);
        service.settings.red_zone_max_distance_meters = Some(10_000.0);
        let spot = pt(10.0, 10.0);
        for _ in 0..4 {
            service.ingest(flood_at(spot)).await.unwrap();
        }

        assert_eq!(service.query_red_zones(spot, 5, Zone::Red).len(), 1);
        let far = destination(spot, 180.0, 20_000.0);
        assert!(service.query_red_zones(far, 5, Zone::Red).is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_is_surfaced() {
        let mut repo = FlakyRepository::new();
        repo.fail_insert = true;
        let service = flaky_service(repo, 10);

        let err = service.ingest(flood_at(pt(0.0, 0.0))).await.unwrap_err();
        assert!(err.is_repository());
        assert!(service.index().is_empty());
    }

    #[tokio::test]
    async fn test_zone_update_failure_leaves_green() {
        let mut repo = FlakyRepository::new();
        repo.fail_update = true;
        // Yellow from the very first report
        let service = flaky_service(repo, 0);
        let here = pt(0.0, 0.0);

        let err = service.ingest(flood_at(here)).await.unwrap_err();
        assert!(err.is_repository());

        // The report exists with the fail-safe zone
        assert_eq!(service.index().len(), 1);
        let hits = service.query_nearby(here, 10.0, 10).unwrap();
        assert_eq!(hits[0].report.zone, Zone::Green);
        assert!(hits[0].report.is_persisted());
    }

    #[tokio::test]
    async fn test_repository_timeout() {
        let mut repo = FlakyRepository::new();
        repo.delay = Some(Duration::from_millis(500));
        let service = flaky_service(repo, 10);

        let err = service.ingest(flood_at(pt(0.0, 0.0))).await.unwrap_err();
        assert!(matches!(err, Error::RepositoryTimeout(50)));
        assert!(service.index().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_file_writes_leave_store_and_index_agreeing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.json");
        let settings = ServiceSettings {
            classifier: ZoneClassifier::new(ZoneThresholds::new(0, 5, 10).unwrap(), 2000.0).unwrap(),
            repository_timeout: Duration::from_nanos(1),
            ..ServiceSettings::default()
        };
        let service = AggregationService::new(
            Arc::new(RTreeIndex::new()),
            JsonFileRepository::open(path.clone()).unwrap(),
            settings,
        );

        let here = pt(-6.2088, 106.8456);
        for _ in 0..20 {
            if let Err(e) = service.ingest(flood_at(here)).await {
                assert!(e.is_repository());
            }
        }

        let stored = service.repository().load_all().await.unwrap();
        let indexed = service.index().snapshot();
        assert_eq!(stored.len(), indexed.len());
        for ((_, report), persisted) in indexed.iter().zip(&stored) {
            assert_eq!(report.id, persisted.id);
            assert_eq!(report.zone, persisted.zone);
        }
    }

    #[tokio::test]
    async fn test_open_restores_index() {
        let here = pt(41.9028, 12.4964);
        let mut stored = Vec::new();
        for (i, zone) in [Zone::Green, Zone::Red, Zone::Orange].into_iter().enumerate() {
            let mut report = Report::new(here, DisasterType::Wildfire, "", "/uploads/f.jpg", Utc::now());
            report.id = format!("stored-{}", i);
            report.zone = zone;
            stored.push(report);
        }

        let service = AggregationService::open(
            Arc::new(RTreeIndex::new()),
            MemoryRepository::with_reports(stored),
            ServiceSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(service.index().len(), 3);
        let red = service.query_red_zones(here, 5, Zone::Red);
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].report.id, "stored-1");
    }

    #[tokio::test]
    async fn test_open_keeps_timestamps_monotonic() {
        let future = Utc::now() + chrono::Duration::hours(2);
        let mut report = Report::new(pt(0.0, 0.0), DisasterType::Other, "", "/uploads/o.jpg", future);
        report.id = "ahead".to_string();

        let service = AggregationService::open(
            Arc::new(RTreeIndex::new()),
            MemoryRepository::with_reports(vec![report]),
            ServiceSettings::default(),
        )
        .await
        .unwrap();

        let fresh = service.ingest(flood_at(pt(0.0, 0.0))).await.unwrap();
        assert!(fresh.created_at >= future - chrono::Duration::microseconds(1));
    }

    #[tokio::test]
    async fn test_reclassify_all() {
        let here = pt(-33.9249, 18.4241);
        let stored: Vec<Report> = (0..12)
            .map(|i| {
                let mut r = Report::new(here, DisasterType::Landslide, "", "/uploads/l.jpg", Utc::now());
                r.id = format!("r{}", i);
                r
            })
            .collect();

        let service = AggregationService::open(
            Arc::new(RTreeIndex::new()),
            MemoryRepository::with_reports(stored),
            ServiceSettings::default(),
        )
        .await
        .unwrap();

        let summary = service.reclassify_all().await.unwrap();
        assert_eq!(summary, ReclassifySummary { examined: 12, changed: 12 });

        let persisted = service.repository().load_all().await.unwrap();
        assert!(persisted.iter().all(|r| r.zone == Zone::Yellow));

        // Second sweep has nothing to do
        let again = service.reclassify_all().await.unwrap();
        assert_eq!(again.changed, 0);
    }

    #[tokio::test]
    async fn test_concurrent_ingest() {
        let service = Arc::new(service());
        let here = pt(19.4326, -99.1332);

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.ingest(flood_at(here)).await })
            })
            .collect();

        let mut zones = Vec::new();
        for task in tasks {
            zones.push(task.await.unwrap().unwrap().zone);
        }

        assert_eq!(service.index().len(), 20);
        // Every count includes at least the reports indexed before it
        let yellow = zones.iter().filter(|z| **z == Zone::Yellow).count();
        assert!(yellow >= 10, "only {} yellow", yellow);
        assert!(zones.iter().all(|z| *z <= Zone::Yellow));
        assert_eq!(service.assess(here).count, 20);
    }

    #[test]
    fn test_list_disaster_types() {
        let types = service().list_disaster_types();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0], "Flood");
    }

    #[tokio::test]
    async fn test_recent_order_keeps_newest_in_radius() {
        let here = pt(35.6762, 139.6503);
        let start = Utc::now() - chrono::Duration::hours(1);
        // Nearest reports are the oldest
        let stored: Vec<Report> = (0..5)
            .map(|i| {
                let location = destination(here, 0.0, 100.0 * (i + 1) as f64);
                let mut r = Report::new(location, DisasterType::Flood, "", "/f", start + chrono::Duration::minutes(i));
                r.id = format!("r{}", i);
                r
            })
            .collect();

        let service = AggregationService::open(
            Arc::new(RTreeIndex::new()),
            MemoryRepository::with_reports(stored),
            ServiceSettings::default(),
        )
        .await
        .unwrap();

        let recent = service
            .query_nearby_ordered(here, 1000.0, 2, NearbyOrder::Recent)
            .unwrap();
        let ids: Vec<&str> = recent.iter().map(|n| n.report.id.as_str()).collect();
        assert_eq!(ids, vec!["r4", "r3"]);

        let nearest = service
            .query_nearby_ordered(here, 1000.0, 2, NearbyOrder::Distance)
            .unwrap();
        let ids: Vec<&str> = nearest.iter().map(|n| n.report.id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r1"]);

        // Outside the radius stays out, however new
        let inner = service
            .query_nearby_ordered(here, 250.0, 10, NearbyOrder::Recent)
            .unwrap();
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_recent_order() {
        let here = pt(0.0, 0.0);
        let older = Report::new(here, DisasterType::Flood, "", "/a", Utc::now() - chrono::Duration::minutes(5));
        let newer = Report::new(here, DisasterType::Flood, "", "/b", Utc::now());

        let mut hits = vec![
            Neighbor { report: older, distance_meters: 5.0 },
            Neighbor { report: newer, distance_meters: 50.0 },
        ];
        NearbyOrder::Recent.apply(&mut hits);
        assert_eq!(hits[0].report.image_ref, "/b");

        NearbyOrder::Distance.apply(&mut hits);
        assert_eq!(hits[0].report.image_ref, "/b");

        assert_eq!(NearbyOrder::from_str("recent").unwrap(), NearbyOrder::Recent);
        assert!(NearbyOrder::from_str("random").is_err());
    }
}
