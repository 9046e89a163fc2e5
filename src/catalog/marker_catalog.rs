//! The marker catalog behind the map screen

use crate::algorithms::{haversine_distance, nearest_by};
use crate::catalog::error::CatalogResult;
use crate::catalog::icons::{Icon, IconCache, IconRef};
use crate::catalog::records::{MarkerCategory, MarkerRecord};
use crate::catalog::source::{load_marker_records, JsonDirectorySource, RecordSource};
use crate::catalog::views::{build_marker_view, MarkerView};
use crate::core::{GeoFix, FIXED_NEAREST_LATITUDE, FIXED_NEAREST_LONGITUDE};
use crate::utils::config::AppConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How "nearest site" is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestStrategy {
    /// Placeholder: always the same coordinate, whatever the input
    #[default]
    Fixed,
    /// Closest loaded record of the category by great-circle distance
    ByDistance,
}

/// Marker records loaded once from a [`RecordSource`], plus the icon cache
/// used to project them for display.
pub struct MarkerCatalog {
    markers: Vec<MarkerRecord>,
    sponsors: Vec<MarkerRecord>,
    team: Vec<MarkerRecord>,
    icons: IconCache,
    nearest: NearestStrategy,
    debug: bool,
}

impl MarkerCatalog {
    /// Load every list from `source`. Any load failure is fatal.
    pub fn load(
        source: &dyn RecordSource,
        icons: IconCache,
        nearest: NearestStrategy,
        debug: bool,
    ) -> CatalogResult<Self> {
        let markers = load_marker_records(source)?;

        let sponsor_rows = source.sponsors()?;
        let sponsors: Vec<MarkerRecord> = sponsor_rows.iter().filter_map(|s| s.to_record()).collect();
        if debug && sponsors.len() != sponsor_rows.len() {
            debug!(skipped = sponsor_rows.len() - sponsors.len(), "sponsors without location");
        }

        let team_rows = source.team()?;
        let team: Vec<MarkerRecord> = team_rows.iter().filter_map(|m| m.to_record()).collect();
        if debug && team.len() != team_rows.len() {
            debug!(skipped = team_rows.len() - team.len(), "team members without location");
        }

        info!(
            markers = markers.len(),
            sponsors = sponsors.len(),
            team = team.len(),
            "marker catalog loaded"
        );

        Ok(Self {
            markers,
            sponsors,
            team,
            icons,
            nearest,
            debug,
        })
    }

    /// Load from the JSON lists in the configured data directory
    pub fn from_config(config: &AppConfig) -> CatalogResult<Self> {
        let source = JsonDirectorySource::new(&config.data_dir).with_file_names(
            &config.markers_file,
            &config.sponsors_file,
            &config.team_file,
        );
        let icons = IconCache::new(&config.assets_dir, config.debug);
        Self::load(&source, icons, config.nearest, config.debug)
    }

    /// Points of interest, placeholders removed, in source order
    pub fn marker_records(&self) -> &[MarkerRecord] {
        &self.markers
    }

    pub fn sponsor_records(&self) -> &[MarkerRecord] {
        &self.sponsors
    }

    pub fn team_records(&self) -> &[MarkerRecord] {
        &self.team
    }

    pub fn build_marker_view(&self, record: &MarkerRecord) -> MarkerView {
        build_marker_view(record, &self.icons)
    }

    pub fn resolve_icon(&self, reference: IconRef<'_>) -> Option<Icon> {
        self.icons.resolve(reference)
    }

    /// Views for points of interest, then sponsors, then team members
    pub fn all_marker_views(&self) -> Vec<MarkerView> {
        let views: Vec<MarkerView> = self
            .markers
            .iter()
            .chain(self.sponsors.iter())
            .chain(self.team.iter())
            .map(|record| self.build_marker_view(record))
            .collect();

        if self.debug {
            debug!(count = views.len(), "built marker views");
        }
        views
    }

    /// Look a record up by its map-wide id
    pub fn find_by_encoded_id(&self, encoded_id: i64) -> Option<&MarkerRecord> {
        self.markers
            .iter()
            .chain(self.sponsors.iter())
            .chain(self.team.iter())
            .find(|record| record.encoded_id() == encoded_id)
    }

    /// Nearest site of `category` to `origin`.
    ///
    /// With [`NearestStrategy::Fixed`] (the default) this is a placeholder
    /// that returns the same coordinate for every input. With
    /// [`NearestStrategy::ByDistance`] it scans the loaded points of
    /// interest and returns `None` when none has the category.
    pub fn find_nearest_of_category(&self, origin: &GeoFix, category: MarkerCategory) -> Option<GeoFix> {
        match self.nearest {
            NearestStrategy::Fixed => {
                if self.debug {
                    debug!(%category, "nearest lookup answered with the fixed coordinate");
                }
                Some(GeoFix::new(FIXED_NEAREST_LATITUDE, FIXED_NEAREST_LONGITUDE))
            }
            NearestStrategy::ByDistance => self.find_nearest_with(origin, category, haversine_distance),
        }
    }

    /// Distance-ranked lookup with a caller-supplied metric (meters).
    /// Ties go to the record listed first.
    pub fn find_nearest_with<M>(&self, origin: &GeoFix, category: MarkerCategory, metric: M) -> Option<GeoFix>
    where
        M: Fn(&GeoFix, &GeoFix) -> f64,
    {
        let candidates = self.markers.iter().filter(|record| record.category == category);
        let (record, meters) = nearest_by(origin, candidates, |record| record.position, metric)?;

        if self.debug {
            debug!(id = record.id, meters, "nearest {} found", category);
        }
        Some(record.position)
    }

    pub fn nearest_strategy(&self) -> NearestStrategy {
        self.nearest
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::icons::BundledIcon;
    use crate::catalog::source::StaticSource;
    use crate::catalog::views::InfoTemplate;
    use crate::tracking::LocationTracker;
    use crate::platform::MockLocationProvider;
    use std::sync::Arc;

    const MARKERS: &str = r#"[
        {"id": 0, "name": "", "type": 0, "gps": {"latitude": 0, "longitude": 0}},
        {"id": 1, "title": "Mesquita Central", "description": "Sexta 12h30", "type": 10,
         "address": "Rua Solon Pinheiro", "gps": {"latitude": -3.72, "longitude": -38.54}},
        {"id": 2, "title": "Mussala Aldeota", "type": 15, "gps": {"latitude": -3.735, "longitude": -38.49}},
        {"id": 3, "title": "Mesquita Sul", "type": 10, "gps": {"latitude": -3.80, "longitude": -38.52}},
        {"id": 4, "title": "Mesquita Norte", "type": 10, "gps": {"latitude": -3.70, "longitude": -38.56}}
    ]"#;

    fn catalog(source: &StaticSource, nearest: NearestStrategy) -> MarkerCatalog {
        MarkerCatalog::load(source, IconCache::new("assets", true), nearest, true).unwrap()
    }

    #[test]
    fn test_one_mosque_and_one_sponsor() {
        let source = StaticSource::from_json(
            r#"[{"id": 1, "type": 10, "gps": {"latitude": -3.72, "longitude": -38.54}}]"#,
            r#"[{"id": 2, "name": "Acme", "gps": {"latitude": -3.92, "longitude": -38.45}}]"#,
            "[]",
        )
        .unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);

        let views = catalog.all_marker_views();
        assert_eq!(views.len(), 2);

        assert_eq!(views[0].record.category, MarkerCategory::Mosque);
        assert_eq!(views[0].template, InfoTemplate::Standard);
        assert_eq!(views[0].icon.as_ref().and_then(Icon::bundled_kind), Some(BundledIcon::Place));

        assert_eq!(views[1].title, "Acme");
        assert_eq!(views[1].record.category, MarkerCategory::Sponsor);
        assert_eq!(views[1].template, InfoTemplate::Standard);
        assert!(views[1].icon.is_none());
        assert_eq!(views[1].position, GeoFix::new(-3.92, -38.45));
    }

    #[test]
    fn test_sponsor_logo_supplies_icon() {
        let source = StaticSource::from_json(
            "[]",
            r#"[{"id": 2, "name": "Acme", "logo": "data:image/png;base64,AAAA",
                 "gps": {"latitude": -3.92, "longitude": -38.45}}]"#,
            "[]",
        )
        .unwrap();
        let views = catalog(&source, NearestStrategy::Fixed).all_marker_views();
        assert!(matches!(views[0].icon, Some(Icon::Inline { .. })));
    }

    #[test]
    fn test_view_order_markers_sponsors_team() {
        let source = StaticSource::from_json(
            MARKERS,
            r#"[{"id": 1, "name": "Acme", "gps": {"latitude": -3.92, "longitude": -38.45}},
                {"id": 2, "name": "No Location"}]"#,
            r#"[{"id": 1, "name": "Yusuf", "role": "dev", "photo": "https://example.com/y.jpg",
                 "gps": {"latitude": -3.75, "longitude": -38.50}}]"#,
        )
        .unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);

        let categories: Vec<MarkerCategory> =
            catalog.all_marker_views().iter().map(|v| v.record.category).collect();
        assert_eq!(
            categories,
            vec![
                MarkerCategory::Mosque,
                MarkerCategory::PrayerRoom,
                MarkerCategory::Mosque,
                MarkerCategory::Mosque,
                MarkerCategory::Sponsor,
                MarkerCategory::TeamMember,
            ]
        );

        let team_view = catalog.all_marker_views().pop().unwrap();
        assert_eq!(team_view.snippet, "dev");
        assert_eq!(team_view.icon.and_then(|i| i.bundled_kind()), Some(BundledIcon::Person));
    }

    #[test]
    fn test_encoded_ids_unique_across_lists() {
        let source = StaticSource::from_json(
            MARKERS,
            r#"[{"id": 1, "name": "Acme", "gps": {"latitude": -3.92, "longitude": -38.45}}]"#,
            r#"[{"id": 1, "name": "Yusuf", "role": "dev", "gps": {"latitude": -3.75, "longitude": -38.50}}]"#,
        )
        .unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);

        let mut ids: Vec<i64> = catalog.all_marker_views().iter().map(|v| v.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);

        let sponsor = catalog.find_by_encoded_id(5_000_000_001).unwrap();
        assert_eq!(sponsor.title, "Acme");
        assert!(catalog.find_by_encoded_id(1).is_none());
    }

    #[test]
    fn test_fixed_nearest_ignores_input() {
        let source = StaticSource::from_json(MARKERS, "[]", "[]").unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);
        let expected = GeoFix::new(-3.7214696, -38.5430259);

        for origin in [GeoFix::new(0.0, 0.0), GeoFix::new(51.5, -0.12), GeoFix::new(-3.80, -38.52)] {
            assert_eq!(catalog.find_nearest_of_category(&origin, MarkerCategory::Mosque), Some(expected));
        }
        assert_eq!(
            catalog.find_nearest_of_category(&GeoFix::new(0.0, 0.0), MarkerCategory::Kaaba),
            Some(expected)
        );
    }

    #[test]
    fn test_nearest_by_distance() {
        let source = StaticSource::from_json(MARKERS, "[]", "[]").unwrap();
        let catalog = catalog(&source, NearestStrategy::ByDistance);

        let near_south = GeoFix::new(-3.79, -38.52);
        assert_eq!(
            catalog.find_nearest_of_category(&near_south, MarkerCategory::Mosque),
            Some(GeoFix::new(-3.80, -38.52))
        );
        // Only one prayer room, whatever the origin
        assert_eq!(
            catalog.find_nearest_of_category(&near_south, MarkerCategory::PrayerRoom),
            Some(GeoFix::new(-3.735, -38.49))
        );
        assert_eq!(catalog.find_nearest_of_category(&near_south, MarkerCategory::Kaaba), None);
    }

    #[test]
    fn test_nearest_with_tracker_metric() {
        let source = StaticSource::from_json(MARKERS, "[]", "[]").unwrap();
        let catalog = catalog(&source, NearestStrategy::ByDistance);
        let tracker = LocationTracker::with_defaults(Arc::new(MockLocationProvider::new()));

        let origin = GeoFix::new(-3.701, -38.559);
        let nearest = catalog
            .find_nearest_with(&origin, MarkerCategory::Mosque, |a, b| tracker.distance(a, b))
            .unwrap();
        assert_eq!(nearest, GeoFix::new(-3.70, -38.56));
    }

    #[test]
    fn test_nearest_ties_go_to_first_listed() {
        let source = StaticSource::from_json(
            r#"[{"id": 1, "title": "East", "type": 10, "gps": {"latitude": 0.0, "longitude": 1.0}},
                {"id": 2, "title": "West", "type": 10, "gps": {"latitude": 0.0, "longitude": -1.0}}]"#,
            "[]",
            "[]",
        )
        .unwrap();
        let catalog = catalog(&source, NearestStrategy::ByDistance);
        assert_eq!(
            catalog.find_nearest_of_category(&GeoFix::new(0.0, 0.0), MarkerCategory::Mosque),
            Some(GeoFix::new(0.0, 1.0))
        );
    }

    #[test]
    fn test_large_raw_ids_still_build_views() {
        let source = StaticSource::from_json(
            r#"[{"id": 100000000, "type": 10, "gps": {"latitude": -3.72, "longitude": -38.54}},
                {"id": 9223372036854775807, "type": 1000, "gps": {"latitude": -3.73, "longitude": -38.55}}]"#,
            "[]",
            "[]",
        )
        .unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);

        let ids: Vec<i64> = catalog.all_marker_views().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1_100_000_000, i64::MAX]);
    }

    #[test]
    fn test_placeholders_not_in_views() {
        let source = StaticSource::from_json(MARKERS, "[]", "[]").unwrap();
        let catalog = catalog(&source, NearestStrategy::Fixed);
        assert_eq!(catalog.marker_records().len(), 4);
        assert!(catalog.all_marker_views().iter().all(|v| v.record.id > 0));
    }
}
