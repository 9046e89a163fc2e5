//! Core data types for location tracking and map markers

use crate::core::constants::DEFAULT_ZOOM;
use serde::{Deserialize, Serialize};

/// A single reported position in geodetic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above the reference ellipsoid (m)
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "altitude")]
    pub elevation: Option<f64>,
    /// Heading in degrees clockwise from north
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            direction: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_direction(mut self, direction: f64) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Latitude and longitude within their geodetic ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Accuracy requested from the platform location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredAccuracy {
    /// Best the hardware can do, used for one-shot fetches
    Highest,
    /// GPS-grade accuracy, used for continuous tracking
    High,
    /// Whatever is cheapest (cell/wifi)
    Any,
}

/// Camera placement handed to the map display surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f32,
    pub bearing: f32,
    pub tilt: f32,
}

impl CameraPosition {
    /// Camera centered on a fix with the default zoom, facing north
    pub fn centered_on(fix: &GeoFix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            zoom: DEFAULT_ZOOM,
            bearing: 0.0,
            tilt: 0.0,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn target(&self) -> GeoFix {
        GeoFix::new(self.latitude, self.longitude)
    }
}
