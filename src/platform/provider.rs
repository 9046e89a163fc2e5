//! Location provider trait and tracking parameters

use crate::core::{DesiredAccuracy, GeoFix};
use crate::platform::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};

/// Callback invoked for every fix delivered by a watch
pub type FixCallback = Box<dyn Fn(GeoFix) + Send + Sync>;

/// Callback invoked when a watch reports an error
pub type ErrorCallback = Box<dyn Fn(ProviderError) + Send + Sync>;

/// Completion for a one-shot fix request
pub type FixReply = Box<dyn FnOnce(ProviderResult<GeoFix>) + Send>;

/// Capability surface of a platform location service.
///
/// Implementations may invoke callbacks from any thread.
pub trait LocationProvider: Send + Sync {
    /// Check whether the location service is switched on and authorized
    fn is_enabled(&self) -> ProviderResult<bool>;

    /// Ask the user to enable/authorize location access
    fn request_authorization(&self) -> ProviderResult<()>;

    /// Request a single fix. `reply` is called exactly once, possibly later
    /// and from another thread. A provider that drops `reply` without
    /// calling it signals that no fix will ever arrive.
    fn request_fix(&self, options: &FixOptions, reply: FixReply);

    /// Start continuous updates
    fn watch(
        &self,
        config: &TrackerConfig,
        on_fix: FixCallback,
        on_error: ErrorCallback,
    ) -> ProviderResult<WatchHandle>;

    /// Cancel a watch started by [`LocationProvider::watch`]
    fn clear_watch(&self, handle: WatchHandle) -> ProviderResult<()>;

    /// Platform-supplied distance in meters, if the service has one
    fn distance(&self, _a: &GeoFix, _b: &GeoFix) -> Option<f64> {
        None
    }
}

/// Handle identifying an active watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u32);

impl WatchHandle {
    pub fn new(id: u32) -> Self {
        WatchHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Parameters for continuous tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub desired_accuracy: DesiredAccuracy,
    /// Distance moved before an update is delivered (m)
    pub update_distance_m: f64,
    /// Time elapsed before an update is delivered (ms)
    pub update_time_ms: u64,
    /// Lower bound between two consecutive updates (ms)
    pub minimum_update_time_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: DesiredAccuracy::High,
            update_distance_m: 7.0,
            update_time_ms: 4000,
            minimum_update_time_ms: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> ProviderResult<()> {
        if !(self.update_distance_m.is_finite() && self.update_distance_m > 0.0) {
            return Err(ProviderError::InvalidConfiguration {
                parameter: "update_distance_m".to_string(),
                value: self.update_distance_m.to_string(),
            });
        }

        if self.update_time_ms == 0 {
            return Err(ProviderError::InvalidConfiguration {
                parameter: "update_time_ms".to_string(),
                value: self.update_time_ms.to_string(),
            });
        }

        if self.minimum_update_time_ms == 0 || self.minimum_update_time_ms > self.update_time_ms {
            return Err(ProviderError::InvalidConfiguration {
                parameter: "minimum_update_time_ms".to_string(),
                value: self.minimum_update_time_ms.to_string(),
            });
        }

        Ok(())
    }
}

/// Options for a one-shot fix. Unset fields fall back to the defaults they
/// are merged over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixOptions {
    pub desired_accuracy: Option<DesiredAccuracy>,
    pub update_distance_m: Option<f64>,
    /// Accept a cached fix no older than this (ms)
    pub maximum_age_ms: Option<u64>,
    /// Give up waiting after this long (ms); no limit when unset
    pub timeout_ms: Option<u64>,
}

impl FixOptions {
    /// Defaults applied to every one-shot request
    pub fn one_shot_defaults() -> Self {
        Self {
            desired_accuracy: Some(DesiredAccuracy::Highest),
            ..Self::default()
        }
    }

    pub fn with_accuracy(mut self, accuracy: DesiredAccuracy) -> Self {
        self.desired_accuracy = Some(accuracy);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_maximum_age_ms(mut self, maximum_age_ms: u64) -> Self {
        self.maximum_age_ms = Some(maximum_age_ms);
        self
    }

    /// Overlay `self` on `defaults`; fields set in `self` win
    pub fn merged_over(&self, defaults: &FixOptions) -> FixOptions {
        FixOptions {
            desired_accuracy: self.desired_accuracy.or(defaults.desired_accuracy),
            update_distance_m: self.update_distance_m.or(defaults.update_distance_m),
            maximum_age_ms: self.maximum_age_ms.or(defaults.maximum_age_ms),
            timeout_ms: self.timeout_ms.or(defaults.timeout_ms),
        }
    }
}
