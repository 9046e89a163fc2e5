//! Core types and constants for the prayer-site map

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
