//! Mock location provider for testing and development

use crate::core::GeoFix;
use crate::platform::{
    ErrorCallback, FixCallback, FixOptions, FixReply, LocationProvider, ProviderError,
    ProviderResult, TrackerConfig, WatchHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SharedFixCallback = Arc<dyn Fn(GeoFix) + Send + Sync>;
type SharedErrorCallback = Arc<dyn Fn(ProviderError) + Send + Sync>;

struct MockState {
    enabled: bool,
    grant_authorization: bool,
    authorization_requests: u32,
    enabled_checks: u32,
    /// Scripted replies for one-shot requests, consumed in order
    fix_replies: Vec<ProviderResult<GeoFix>>,
    /// Requests with no scripted reply, waiting for `complete_pending`
    pending_replies: Vec<FixReply>,
    last_fix_options: Option<FixOptions>,
    watch_failure: Option<ProviderError>,
    watches: HashMap<WatchHandle, (SharedFixCallback, SharedErrorCallback)>,
    watch_calls: u32,
    cleared: Vec<WatchHandle>,
    last_watch_config: Option<TrackerConfig>,
    next_handle: u32,
    platform_distance: Option<f64>,
}

/// In-memory location provider with scriptable outcomes.
///
/// Fixes and errors are pushed to active watches with [`emit_fix`] and
/// [`emit_error`]; every interaction is counted so tests can assert on it.
///
/// [`emit_fix`]: MockLocationProvider::emit_fix
/// [`emit_error`]: MockLocationProvider::emit_error
pub struct MockLocationProvider {
    state: Mutex<MockState>,
}

impl MockLocationProvider {
    /// Create an enabled provider with no scripted replies
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                enabled: true,
                grant_authorization: true,
                authorization_requests: 0,
                enabled_checks: 0,
                fix_replies: Vec::new(),
                pending_replies: Vec::new(),
                last_fix_options: None,
                watch_failure: None,
                watches: HashMap::new(),
                watch_calls: 0,
                cleared: Vec::new(),
                last_watch_config: None,
                next_handle: 1,
                platform_distance: None,
            }),
        }
    }

    /// Provider whose service starts switched off
    pub fn disabled(grant_authorization: bool) -> Self {
        let provider = Self::new();
        {
            let mut state = provider.lock();
            state.enabled = false;
            state.grant_authorization = grant_authorization;
        }
        provider
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the outcome of the next one-shot request
    pub fn push_fix_reply(&self, reply: ProviderResult<GeoFix>) {
        self.lock().fix_replies.push(reply);
    }

    /// Make the next `watch` call fail
    pub fn fail_next_watch(&self, error: ProviderError) {
        self.lock().watch_failure = Some(error);
    }

    /// Pretend the platform offers its own distance computation
    pub fn set_platform_distance(&self, meters: Option<f64>) {
        self.lock().platform_distance = meters;
    }

    /// Deliver a fix to every active watch
    pub fn emit_fix(&self, fix: GeoFix) {
        let callbacks: Vec<SharedFixCallback> =
            self.lock().watches.values().map(|(on_fix, _)| on_fix.clone()).collect();
        for callback in callbacks {
            callback(fix);
        }
    }

    /// Deliver an error to every active watch
    pub fn emit_error(&self, error: ProviderError) {
        let callbacks: Vec<SharedErrorCallback> =
            self.lock().watches.values().map(|(_, on_error)| on_error.clone()).collect();
        for callback in callbacks {
            callback(error.clone());
        }
    }

    /// Answer every one-shot request that had no scripted reply
    pub fn complete_pending(&self, reply: ProviderResult<GeoFix>) -> usize {
        let pending: Vec<FixReply> = self.lock().pending_replies.drain(..).collect();
        let count = pending.len();
        for complete in pending {
            complete(reply.clone());
        }
        count
    }

    /// Drop pending one-shot requests without answering them
    pub fn abandon_pending(&self) -> usize {
        let mut state = self.lock();
        let count = state.pending_replies.len();
        state.pending_replies.clear();
        count
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending_replies.len()
    }

    pub fn active_watch_count(&self) -> usize {
        self.lock().watches.len()
    }

    /// Total successful `watch` subscriptions
    pub fn watch_calls(&self) -> u32 {
        self.lock().watch_calls
    }

    pub fn authorization_requests(&self) -> u32 {
        self.lock().authorization_requests
    }

    pub fn enabled_checks(&self) -> u32 {
        self.lock().enabled_checks
    }

    pub fn cleared_handles(&self) -> Vec<WatchHandle> {
        self.lock().cleared.clone()
    }

    pub fn last_watch_config(&self) -> Option<TrackerConfig> {
        self.lock().last_watch_config.clone()
    }

    pub fn last_fix_options(&self) -> Option<FixOptions> {
        self.lock().last_fix_options.clone()
    }
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for MockLocationProvider {
    fn is_enabled(&self) -> ProviderResult<bool> {
        let mut state = self.lock();
        state.enabled_checks += 1;
        Ok(state.enabled)
    }

    fn request_authorization(&self) -> ProviderResult<()> {
        let mut state = self.lock();
        state.authorization_requests += 1;
        if state.grant_authorization {
            state.enabled = true;
            Ok(())
        } else {
            Err(ProviderError::PermissionDenied)
        }
    }

    fn request_fix(&self, options: &FixOptions, reply: FixReply) {
        let scripted = {
            let mut state = self.lock();
            state.last_fix_options = Some(options.clone());
            if state.fix_replies.is_empty() {
                state.pending_replies.push(reply);
                return;
            }
            state.fix_replies.remove(0)
        };
        reply(scripted);
    }

    fn watch(
        &self,
        config: &TrackerConfig,
        on_fix: FixCallback,
        on_error: ErrorCallback,
    ) -> ProviderResult<WatchHandle> {
        config.validate()?;

        let mut state = self.lock();
        if let Some(error) = state.watch_failure.take() {
            return Err(error);
        }
        if !state.enabled {
            return Err(ProviderError::ServiceDisabled);
        }

        let handle = WatchHandle::new(state.next_handle);
        state.next_handle += 1;
        state.watch_calls += 1;
        state.last_watch_config = Some(config.clone());
        state.watches.insert(handle, (Arc::from(on_fix), Arc::from(on_error)));
        Ok(handle)
    }

    fn clear_watch(&self, handle: WatchHandle) -> ProviderResult<()> {
        let mut state = self.lock();
        if state.watches.remove(&handle).is_none() {
            return Err(ProviderError::InvalidHandle { handle: handle.id() });
        }
        state.cleared.push(handle);
        Ok(())
    }

    fn distance(&self, _a: &GeoFix, _b: &GeoFix) -> Option<f64> {
        self.lock().platform_distance
    }
}
