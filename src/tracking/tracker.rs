//! Live location tracking over a platform location provider

use crate::algorithms::haversine_distance;
use crate::core::GeoFix;
use crate::platform::{
    ErrorCallback, FixCallback, FixOptions, LocationProvider, ProviderError, TrackerConfig,
    WatchHandle,
};
use crate::tracking::broadcast::{FixBroadcast, FixSubscription};
use crate::tracking::pending::PendingFix;
use crate::tracking::types::{TrackerError, TrackerResult, TrackerState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct TrackerInner {
    watch: Option<WatchHandle>,
    disposed: bool,
}

/// Owns the single upstream watch on a [`LocationProvider`] and republishes
/// its fixes to any number of subscribers.
///
/// All methods take `&self`; the tracker can be shared behind an `Arc`.
/// Provider callbacks only touch the broadcast, never the tracker lock.
pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    config: TrackerConfig,
    broadcast: Arc<FixBroadcast>,
    inner: Mutex<TrackerInner>,
    debug: bool,
}

impl LocationTracker {
    pub fn new(provider: Arc<dyn LocationProvider>, config: TrackerConfig, debug: bool) -> Self {
        if debug {
            debug!(?config, "LocationTracker created");
        }
        Self {
            provider,
            config,
            broadcast: Arc::new(FixBroadcast::new()),
            inner: Mutex::new(TrackerInner {
                watch: None,
                disposed: false,
            }),
            debug,
        }
    }

    /// Tracker with the default tracking parameters and debug logging off
    pub fn with_defaults(provider: Arc<dyn LocationProvider>) -> Self {
        Self::new(provider, TrackerConfig::default(), false)
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to continuous updates if not already subscribed.
    ///
    /// Returns the active watch handle, or `None` when tracking could not
    /// start. Failures are logged; calling `start` again retries.
    pub fn start(&self) -> Option<WatchHandle> {
        let mut inner = self.lock();

        if inner.disposed {
            warn!("start called on a disposed LocationTracker");
            return None;
        }

        if let Some(handle) = inner.watch {
            if self.debug {
                debug!(watch = handle.id(), "location tracking already started");
            }
            return Some(handle);
        }

        if let Err(e) = self.ensure_enabled() {
            warn!(error = %e, "location tracking not started");
            return None;
        }

        let broadcast = self.broadcast.clone();
        let debug = self.debug;
        let on_fix: FixCallback = Box::new(move |fix| {
            if debug {
                debug!(latitude = fix.latitude, longitude = fix.longitude, "received location");
            }
            broadcast.publish(fix);
        });
        // Transient watch errors leave the subscription running
        let on_error: ErrorCallback = Box::new(|e: ProviderError| {
            warn!(error = %e, "location watch reported an error");
        });

        match self.provider.watch(&self.config, on_fix, on_error) {
            Ok(handle) => {
                info!(watch = handle.id(), "location tracking started");
                inner.watch = Some(handle);
                Some(handle)
            }
            Err(e) => {
                error!(error = %e, "failed to subscribe to location updates");
                None
            }
        }
    }

    /// Check the service and, when it is off, ask for authorization once
    fn ensure_enabled(&self) -> TrackerResult<()> {
        if self.provider.is_enabled()? {
            return Ok(());
        }

        if self.debug {
            debug!("location service not enabled, requesting authorization");
        }

        self.provider.request_authorization().map_err(|e| match e {
            ProviderError::PermissionDenied => TrackerError::PermissionDenied,
            _ => TrackerError::ServiceDisabled,
        })
    }

    /// Cancel the upstream watch. Safe to call when not started.
    /// Returns whether a watch was cancelled.
    pub fn stop(&self) -> bool {
        let handle = self.lock().watch.take();
        self.clear_watch(handle)
    }

    fn clear_watch(&self, handle: Option<WatchHandle>) -> bool {
        match handle {
            Some(handle) => {
                if let Err(e) = self.provider.clear_watch(handle) {
                    warn!(watch = handle.id(), error = %e, "failed to clear location watch");
                }
                if self.debug {
                    debug!(watch = handle.id(), "location tracking stopped");
                }
                true
            }
            None => false,
        }
    }

    /// One-shot fix request.
    ///
    /// `overrides` are merged over `{desired_accuracy: Highest}` with the
    /// override fields taking precedence. Setting `timeout_ms` bounds
    /// [`PendingFix::wait`]; by default it waits for the provider.
    pub fn get_current_fix(&self, overrides: Option<FixOptions>) -> PendingFix {
        if self.lock().disposed {
            return PendingFix::failed(TrackerError::Disposed);
        }

        let options = overrides
            .unwrap_or_default()
            .merged_over(&FixOptions::one_shot_defaults());
        if self.debug {
            debug!(?options, "requesting current location");
        }

        let (reply, pending) = PendingFix::channel(options.timeout_ms.map(Duration::from_millis));
        self.provider.request_fix(&options, reply);
        pending
    }

    /// Blocking convenience over [`LocationTracker::get_current_fix`]
    pub fn current_fix(&self, overrides: Option<FixOptions>) -> TrackerResult<GeoFix> {
        self.get_current_fix(overrides).wait()
    }

    /// Subscribe to fixes. The latest known fix, if any, is delivered first.
    /// The subscription ends when the tracker is disposed.
    pub fn location_updates(&self) -> FixSubscription {
        self.broadcast.subscribe()
    }

    /// Great-circle distance in meters; the provider's own computation when
    /// it offers one, haversine otherwise.
    pub fn distance(&self, a: &GeoFix, b: &GeoFix) -> f64 {
        self.provider
            .distance(a, b)
            .unwrap_or_else(|| haversine_distance(a, b))
    }

    /// Stop tracking and close the update stream. The tracker must not be
    /// started again afterwards.
    pub fn dispose(&self) {
        if self.debug {
            debug!("disposing LocationTracker");
        }
        // One guard: no start may slip in between
        let handle = {
            let mut inner = self.lock();
            inner.disposed = true;
            inner.watch.take()
        };
        self.clear_watch(handle);
        self.broadcast.close();
    }

    pub fn last_fix(&self) -> Option<GeoFix> {
        self.broadcast.latest()
    }

    pub fn watch_handle(&self) -> Option<WatchHandle> {
        self.lock().watch
    }

    pub fn is_tracking(&self) -> bool {
        self.lock().watch.is_some()
    }

    pub fn state(&self) -> TrackerState {
        let inner = self.lock();
        if inner.disposed {
            TrackerState::Disposed
        } else if inner.watch.is_some() {
            TrackerState::Tracking
        } else {
            TrackerState::Idle
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
