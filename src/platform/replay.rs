//! Replays a recorded fix track as if it came from the device

use crate::core::GeoFix;
use crate::platform::{
    ErrorCallback, FixCallback, FixOptions, FixReply, LocationProvider, ProviderError,
    ProviderResult, TrackerConfig, WatchHandle,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Provider that plays back a fixed list of fixes.
///
/// Each watch gets its own background thread that walks the track once,
/// sleeping `interval` between fixes, and drops its entry from the running
/// set when the track ends. One-shot requests are answered with the first
/// fix of the track.
pub struct ReplayProvider {
    track: Arc<Vec<GeoFix>>,
    interval: Duration,
    next_handle: AtomicU32,
    running: Arc<Mutex<HashMap<WatchHandle, Arc<AtomicBool>>>>,
}

impl ReplayProvider {
    pub fn new(track: Vec<GeoFix>, interval: Duration) -> Self {
        Self {
            track: Arc::new(track),
            interval,
            next_handle: AtomicU32::new(1),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load a JSON array of fixes
    pub fn from_file<P: AsRef<Path>>(path: P, interval: Duration) -> ProviderResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| {
            ProviderError::unavailable(format!("failed to read track '{}': {}", path_str, e))
        })?;
        let track: Vec<GeoFix> = serde_json::from_str(&content).map_err(|e| {
            ProviderError::unavailable(format!("failed to parse track '{}': {}", path_str, e))
        })?;

        Ok(Self::new(track, interval))
    }

    pub fn track_len(&self) -> usize {
        self.track.len()
    }

    /// Watches whose track is still playing
    pub fn running_count(&self) -> usize {
        self.running.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn was_issued(&self, handle: WatchHandle) -> bool {
        handle.id() >= 1 && handle.id() < self.next_handle.load(Ordering::SeqCst)
    }
}

impl LocationProvider for ReplayProvider {
    fn is_enabled(&self) -> ProviderResult<bool> {
        Ok(true)
    }

    fn request_authorization(&self) -> ProviderResult<()> {
        Ok(())
    }

    fn request_fix(&self, _options: &FixOptions, reply: FixReply) {
        match self.track.first() {
            Some(fix) => reply(Ok(*fix)),
            None => reply(Err(ProviderError::unavailable("empty track"))),
        }
    }

    fn watch(
        &self,
        config: &TrackerConfig,
        on_fix: FixCallback,
        on_error: ErrorCallback,
    ) -> ProviderResult<WatchHandle> {
        config.validate()?;

        let handle = WatchHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let cancelled = Arc::new(AtomicBool::new(false));
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, cancelled.clone());

        let track = self.track.clone();
        let interval = self.interval;
        let running = self.running.clone();
        let spawned = thread::Builder::new()
            .name(format!("replay-watch-{}", handle.id()))
            .spawn(move || {
                for fix in track.iter() {
                    if cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    if fix.is_valid() {
                        on_fix(*fix);
                    } else {
                        on_error(ProviderError::unavailable(format!(
                            "invalid fix {}, {}",
                            fix.latitude, fix.longitude
                        )));
                    }
                    thread::sleep(interval);
                }
                running.lock().unwrap_or_else(PoisonError::into_inner).remove(&handle);
                debug!(watch = handle.id(), "replay track finished");
            });

        if let Err(e) = spawned {
            self.running.lock().unwrap_or_else(PoisonError::into_inner).remove(&handle);
            return Err(ProviderError::unavailable(format!("failed to spawn replay: {}", e)));
        }
        Ok(handle)
    }

    fn clear_watch(&self, handle: WatchHandle) -> ProviderResult<()> {
        let removed = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);

        match removed {
            Some(cancelled) => {
                cancelled.store(true, Ordering::SeqCst);
                Ok(())
            }
            // Track already played out
            None if self.was_issued(handle) => Ok(()),
            None => {
                warn!(watch = handle.id(), "clear_watch on unknown replay handle");
                Err(ProviderError::InvalidHandle { handle: handle.id() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_replay_delivers_track_in_order() {
        let track = vec![GeoFix::new(1.0, 1.0), GeoFix::new(2.0, 2.0), GeoFix::new(3.0, 3.0)];
        let provider = ReplayProvider::new(track.clone(), Duration::from_millis(1));

        let (tx, rx) = unbounded();
        provider
            .watch(
                &TrackerConfig::default(),
                Box::new(move |fix| {
                    let _ = tx.send(fix);
                }),
                Box::new(|_| {}),
            )
            .unwrap();

        let received: Vec<GeoFix> = rx.iter().take(3).collect();
        assert_eq!(received, track);
    }

    #[test]
    fn test_invalid_fix_reported_as_error() {
        let provider =
            ReplayProvider::new(vec![GeoFix::new(120.0, 0.0)], Duration::from_millis(1));
        let (tx, rx) = unbounded();
        provider
            .watch(
                &TrackerConfig::default(),
                Box::new(|_| {}),
                Box::new(move |e| {
                    let _ = tx.send(e);
                }),
            )
            .unwrap();

        let err = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(err.is_transient());
    }

    #[test]
    fn test_one_shot_uses_first_fix() {
        let provider = ReplayProvider::new(vec![GeoFix::new(4.0, 5.0)], Duration::from_millis(1));
        let (tx, rx) = unbounded();
        provider.request_fix(
            &FixOptions::default(),
            Box::new(move |r| {
                let _ = tx.send(r);
            }),
        );
        assert_eq!(rx.recv().unwrap(), Ok(GeoFix::new(4.0, 5.0)));
    }

    #[test]
    fn test_clear_unknown_handle() {
        let provider = ReplayProvider::new(Vec::new(), Duration::from_millis(1));
        assert!(provider.clear_watch(WatchHandle::new(9)).is_err());
    }

    #[test]
    fn test_finished_track_leaves_running_set() {
        let provider = ReplayProvider::new(vec![GeoFix::new(1.0, 1.0)], Duration::from_millis(1));
        let (tx, rx) = unbounded();
        let handle = provider
            .watch(
                &TrackerConfig::default(),
                Box::new(move |fix| {
                    let _ = tx.send(fix);
                }),
                Box::new(|_| {}),
            )
            .unwrap();

        // The sender is dropped with the callback once the worker exits
        assert_eq!(rx.recv().unwrap(), GeoFix::new(1.0, 1.0));
        assert!(rx.recv().is_err());
        assert_eq!(provider.running_count(), 0);

        assert!(provider.clear_watch(handle).is_ok());
    }

    #[test]
    fn test_missing_track_file() {
        let result = ReplayProvider::from_file("/nonexistent/track.json", Duration::from_millis(1));
        assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
    }
}
