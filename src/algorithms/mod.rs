//! Geodesic algorithms used by the tracker and the marker catalog

pub mod distance;
pub mod nearest;

pub use distance::haversine_distance;
pub use nearest::nearest_by;
