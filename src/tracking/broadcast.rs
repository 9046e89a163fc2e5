//! Multicast of location fixes with replay of the latest value

use crate::core::GeoFix;
use crossbeam_channel::{unbounded, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct BroadcastState {
    latest: Option<GeoFix>,
    subscribers: Vec<Sender<GeoFix>>,
    closed: bool,
}

/// Fan-out of fixes to any number of subscribers.
///
/// Every subscriber owns an unbounded queue, so a slow reader never holds
/// up the publisher or its siblings. A new subscriber first receives the
/// latest published fix, if any. Subscribers whose receiver was dropped
/// are pruned on the next publish.
pub struct FixBroadcast {
    state: Mutex<BroadcastState>,
}

impl FixBroadcast {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BroadcastState {
                latest: None,
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BroadcastState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `fix` as latest and deliver it to every live subscriber.
    /// Returns the number of subscribers reached; ignored once closed.
    pub fn publish(&self, fix: GeoFix) -> usize {
        let mut state = self.lock();
        if state.closed {
            return 0;
        }
        state.latest = Some(fix);
        state.subscribers.retain(|tx| tx.send(fix).is_ok());
        state.subscribers.len()
    }

    /// Register a subscriber, seeding it with the latest fix
    pub fn subscribe(&self) -> FixSubscription {
        let (tx, rx) = unbounded();
        let mut state = self.lock();
        if !state.closed {
            if let Some(latest) = state.latest {
                let _ = tx.send(latest);
            }
            state.subscribers.push(tx);
        }
        // When closed, `tx` drops here and the receiver is already disconnected
        FixSubscription { receiver: rx }
    }

    pub fn latest(&self) -> Option<GeoFix> {
        self.lock().latest
    }

    /// Disconnect every subscriber; queued fixes stay readable
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl Default for FixBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of [`FixBroadcast`]. Dropping it unsubscribes.
pub struct FixSubscription {
    receiver: Receiver<GeoFix>,
}

impl FixSubscription {
    /// Block until the next fix; `None` once the broadcast is closed and drained
    pub fn recv(&self) -> Option<GeoFix> {
        match self.receiver.recv() {
            Ok(fix) => Some(fix),
            Err(RecvError) => None,
        }
    }

    /// Next fix if one is already queued
    pub fn try_recv(&self) -> Option<GeoFix> {
        match self.receiver.try_recv() {
            Ok(fix) => Some(fix),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<GeoFix> {
        match self.receiver.recv_timeout(timeout) {
            Ok(fix) => Some(fix),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Blocking iterator that ends when the broadcast closes
    pub fn iter(&self) -> impl Iterator<Item = GeoFix> + '_ {
        self.receiver.iter()
    }

    /// Access the raw channel, e.g. for `crossbeam_channel::select!`
    pub fn receiver(&self) -> &Receiver<GeoFix> {
        &self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_subscriber_gets_latest_first() {
        let broadcast = FixBroadcast::new();
        broadcast.publish(GeoFix::new(1.0, 1.0));
        broadcast.publish(GeoFix::new(2.0, 2.0));

        let sub = broadcast.subscribe();
        assert_eq!(sub.try_recv(), Some(GeoFix::new(2.0, 2.0)));
        assert_eq!(sub.try_recv(), None);

        broadcast.publish(GeoFix::new(3.0, 3.0));
        assert_eq!(sub.try_recv(), Some(GeoFix::new(3.0, 3.0)));
    }

    #[test]
    fn test_subscriber_before_any_fix_gets_nothing() {
        let broadcast = FixBroadcast::new();
        let sub = broadcast.subscribe();
        assert_eq!(sub.recv_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_every_subscriber_sees_every_fix() {
        let broadcast = FixBroadcast::new();
        let a = broadcast.subscribe();
        let b = broadcast.subscribe();

        for i in 0..5 {
            assert_eq!(broadcast.publish(GeoFix::new(i as f64, 0.0)), 2);
        }

        let from_a: Vec<f64> = (0..5).filter_map(|_| a.try_recv()).map(|f| f.latitude).collect();
        let from_b: Vec<f64> = (0..5).filter_map(|_| b.try_recv()).map(|f| f.latitude).collect();
        assert_eq!(from_a, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn test_slow_subscriber_does_not_block_publisher() {
        let broadcast = FixBroadcast::new();
        let _idle = broadcast.subscribe();
        let active = broadcast.subscribe();

        for i in 0..10_000 {
            broadcast.publish(GeoFix::new(0.0, i as f64 / 100.0));
        }
        assert_eq!(active.iter().take(10_000).count(), 10_000);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let broadcast = FixBroadcast::new();
        let kept = broadcast.subscribe();
        drop(broadcast.subscribe());
        assert_eq!(broadcast.subscriber_count(), 2);

        assert_eq!(broadcast.publish(GeoFix::new(1.0, 1.0)), 1);
        assert_eq!(broadcast.subscriber_count(), 1);
        assert!(kept.try_recv().is_some());
    }

    #[test]
    fn test_close_drains_then_finishes() {
        let broadcast = FixBroadcast::new();
        let sub = broadcast.subscribe();
        broadcast.publish(GeoFix::new(1.0, 1.0));
        broadcast.close();

        assert_eq!(broadcast.publish(GeoFix::new(2.0, 2.0)), 0);
        assert_eq!(sub.recv(), Some(GeoFix::new(1.0, 1.0)));
        assert_eq!(sub.recv(), None);

        let late = broadcast.subscribe();
        assert_eq!(late.recv(), None);
    }

    #[test]
    fn test_publish_from_other_thread() {
        let broadcast = Arc::new(FixBroadcast::new());
        let sub = broadcast.subscribe();

        let publisher = broadcast.clone();
        let worker = thread::spawn(move || {
            for i in 0..3 {
                publisher.publish(GeoFix::new(i as f64, i as f64));
            }
            publisher.close();
        });

        let fixes: Vec<GeoFix> = sub.iter().collect();
        worker.join().unwrap();
        assert_eq!(fixes.len(), 3);
        assert_eq!(broadcast.latest(), Some(GeoFix::new(2.0, 2.0)));
    }
}
