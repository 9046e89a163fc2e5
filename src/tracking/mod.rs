//! Location tracking
//!
//! [`LocationTracker`] owns one upstream watch on a platform provider and
//! republishes fixes through a replay-latest broadcast. One-shot fetches
//! are returned as [`PendingFix`] values completed by the provider.

pub mod tracker;
pub mod broadcast;
pub mod pending;
pub mod types;

pub use tracker::LocationTracker;
pub use broadcast::{FixBroadcast, FixSubscription};
pub use pending::PendingFix;
pub use types::{TrackerError, TrackerResult, TrackerState};
