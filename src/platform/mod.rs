//! Platform location service abstraction
//!
//! The tracker only talks to the [`LocationProvider`] capability surface.
//! Concrete OS bindings live outside this crate; [`MockLocationProvider`]
//! and [`ReplayProvider`] cover tests and offline runs.

pub mod provider;
pub mod mock;
pub mod replay;
pub mod error;

pub use provider::{
    LocationProvider, WatchHandle, TrackerConfig, FixOptions,
    FixCallback, ErrorCallback, FixReply
};
pub use mock::MockLocationProvider;
pub use replay::ReplayProvider;
pub use error::{ProviderError, ProviderResult};
