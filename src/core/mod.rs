//! Core Module - Risk Pipeline
//!
//! Denylist classification, scoring backends and the scorer that ties them
//! to the audit ledger.

pub mod classifier;
pub mod risk_model;
pub mod scorer;

pub use classifier::*;
pub use risk_model::*;
pub use scorer::*;
