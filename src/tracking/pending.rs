//! Pending one-shot location requests

use crate::core::GeoFix;
use crate::platform::{FixReply, ProviderError};
use crate::tracking::types::{TrackerError, TrackerResult};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Outcome of a one-shot fetch that may still be in flight.
///
/// The provider completes it from whatever thread it likes; the caller
/// decides whether to block, poll, or bound the wait.
pub struct PendingFix {
    receiver: Receiver<TrackerResult<GeoFix>>,
    timeout: Option<Duration>,
}

impl PendingFix {
    /// Create the pending side and the reply handed to the provider
    pub(crate) fn channel(timeout: Option<Duration>) -> (FixReply, Self) {
        let (tx, rx) = bounded(1);
        let reply: FixReply = Box::new(move |result| {
            let _ = tx.send(result.map_err(Self::unavailable));
        });
        (reply, Self { receiver: rx, timeout })
    }

    /// A request that failed before reaching the provider
    pub(crate) fn failed(error: TrackerError) -> Self {
        let (tx, rx) = bounded(1);
        let _ = tx.send(Err(error));
        Self { receiver: rx, timeout: None }
    }

    /// Block until the provider answers, honouring the request timeout if one
    /// was set. Without a timeout this waits as long as the provider does.
    pub fn wait(self) -> TrackerResult<GeoFix> {
        if let Some(timeout) = self.timeout {
            return self.wait_timeout(timeout);
        }
        self.receiver.recv().unwrap_or_else(|_| Err(Self::dropped()))
    }

    /// Block for at most `timeout`
    pub fn wait_timeout(self, timeout: Duration) -> TrackerResult<GeoFix> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(TrackerError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(Self::dropped()),
        }
    }

    /// Non-blocking poll; `None` while the request is still in flight
    pub fn try_get(&self) -> Option<TrackerResult<GeoFix>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Self::dropped())),
        }
    }

    // Every provider rejection of a one-shot fetch surfaces as unavailable
    fn unavailable(error: ProviderError) -> TrackerError {
        TrackerError::LocationUnavailable {
            reason: error.to_string(),
        }
    }

    fn dropped() -> TrackerError {
        TrackerError::LocationUnavailable {
            reason: "provider dropped the request".to_string(),
        }
    }
}
