//! Mussala Map Core
//!
//! Location tracking and a marker catalog of mosques, prayer rooms and
//! other points of interest for a community map.

pub mod core;
pub mod algorithms;
pub mod platform;
pub mod tracking;
pub mod catalog;
pub mod utils;

// Re-export commonly used types
pub use core::{GeoFix, DesiredAccuracy, CameraPosition};
pub use algorithms::{haversine_distance, nearest_by};
pub use platform::{
    LocationProvider, WatchHandle, TrackerConfig, FixOptions,
    MockLocationProvider, ReplayProvider, ProviderError, ProviderResult
};
pub use tracking::{LocationTracker, FixSubscription, PendingFix, TrackerError, TrackerResult, TrackerState};
pub use catalog::{
    MarkerCatalog, NearestStrategy, MarkerCategory, MarkerRecord, MarkerSource, MarkerView,
    InfoTemplate, Icon, IconCache, RecordSource, JsonDirectorySource, StaticSource,
    CatalogError, CatalogResult, encode_id
};
pub use utils::{AppConfig, ConfigError, ConfigurationManager};
