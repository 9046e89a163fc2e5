//! Constants shared by location tracking and the marker catalog

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Multiplier applied to a category code when packing marker ids
pub const ID_CATEGORY_STRIDE: i64 = 100_000_000;

/// Coordinate returned by the fixed nearest-site lookup
pub const FIXED_NEAREST_LATITUDE: f64 = -3.7214696;
pub const FIXED_NEAREST_LONGITUDE: f64 = -38.5430259;

/// Default camera zoom for the map screen
pub const DEFAULT_ZOOM: f32 = 17.0;

/// Info window template used for every marker category
pub const STANDARD_TEMPLATE: &str = "IslamicMarkerTemplate";

/// Bundled icon assets, relative to the assets directory
pub const PLACE_ICON_ASSET: &str = "images/mussala-maps/quipla.png";
pub const PERSON_ICON_ASSET: &str = "images/mussala-maps/person.png";
