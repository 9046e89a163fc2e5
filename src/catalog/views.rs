//! Display projections of marker records

use crate::catalog::icons::{Icon, IconCache, IconRef};
use crate::catalog::records::{MarkerCategory, MarkerRecord};
use crate::core::{GeoFix, STANDARD_TEMPLATE};
use serde::Serialize;

/// Info window template shown when a marker is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoTemplate {
    Standard,
}

impl InfoTemplate {
    /// Every category uses the standard template for now
    pub fn for_category(_category: MarkerCategory) -> Self {
        InfoTemplate::Standard
    }

    /// Template key understood by the map surface
    pub fn key(&self) -> &'static str {
        match self {
            InfoTemplate::Standard => STANDARD_TEMPLATE,
        }
    }
}

/// What the map surface needs to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    /// Map-wide id, unique across merged lists
    pub id: i64,
    pub title: String,
    pub snippet: String,
    pub template: InfoTemplate,
    pub position: GeoFix,
    /// `None` means the surface should use its default marker
    pub icon: Option<Icon>,
    pub record: MarkerRecord,
}

/// Project a record for display. The record's own photo/logo reference
/// wins over the category icon when it resolves.
pub fn build_marker_view(record: &MarkerRecord, icons: &IconCache) -> MarkerView {
    let icon = record
        .photo_ref
        .as_deref()
        .and_then(|reference| icons.resolve(IconRef::Reference(reference)))
        .or_else(|| icons.resolve(IconRef::Category(record.category)));

    MarkerView {
        id: record.encoded_id(),
        title: record.title.clone(),
        snippet: record.description.clone(),
        template: InfoTemplate::for_category(record.category),
        position: record.position,
        icon,
        record: record.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::icons::BundledIcon;

    fn record(category: MarkerCategory, photo_ref: Option<&str>) -> MarkerRecord {
        MarkerRecord {
            id: 7,
            title: "Site".to_string(),
            description: "Open for all prayers".to_string(),
            address: "Av. Central".to_string(),
            category,
            position: GeoFix::new(-3.72, -38.54),
            photo_ref: photo_ref.map(str::to_string),
            contacts: Vec::new(),
        }
    }

    #[test]
    fn test_every_category_uses_standard_template() {
        for category in MarkerCategory::ALL {
            assert_eq!(InfoTemplate::for_category(category), InfoTemplate::Standard);
        }
        assert_eq!(InfoTemplate::Standard.key(), "IslamicMarkerTemplate");
    }

    #[test]
    fn test_view_fields() {
        let icons = IconCache::new("assets", false);
        let view = build_marker_view(&record(MarkerCategory::Mosque, None), &icons);

        assert_eq!(view.id, 1_000_000_007);
        assert_eq!(view.title, "Site");
        assert_eq!(view.snippet, "Open for all prayers");
        assert_eq!(view.position, GeoFix::new(-3.72, -38.54));
        assert_eq!(view.icon.unwrap().bundled_kind(), Some(BundledIcon::Place));
    }

    #[test]
    fn test_photo_reference_wins() {
        let icons = IconCache::new("assets", false);
        let view = build_marker_view(
            &record(MarkerCategory::Mosque, Some("data:image/png;base64,AAAA")),
            &icons,
        );
        assert!(matches!(view.icon, Some(Icon::Inline { .. })));
    }

    #[test]
    fn test_unresolvable_photo_falls_back_to_category() {
        let icons = IconCache::new("assets", false);
        let view = build_marker_view(&record(MarkerCategory::Person, Some("photo.jpg")), &icons);
        assert_eq!(view.icon.unwrap().bundled_kind(), Some(BundledIcon::Person));

        let view = build_marker_view(&record(MarkerCategory::Sponsor, Some("photo.jpg")), &icons);
        assert!(view.icon.is_none());
    }

    #[test]
    fn test_undecodable_logo_still_builds_view() {
        let icons = IconCache::new("assets", false);
        let sponsor = record(MarkerCategory::Sponsor, Some("data:image/png;base64,@@@"));
        let view = build_marker_view(&sponsor, &icons);

        assert_eq!(view.id, 5_000_000_007);
        assert_eq!(view.title, "Site");
        assert_eq!(view.template, InfoTemplate::Standard);
        assert!(view.icon.is_none());
        assert_eq!(icons.cached_count(), 0);
    }
}
