//! Utils Module - Helper Functions & Shared Utilities

pub mod constants;
pub mod hashing;
pub mod telemetry;

pub use constants::*;
pub use hashing::*;
pub use telemetry::*;
