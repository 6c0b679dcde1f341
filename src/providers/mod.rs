//! Providers Module - External Collaborators
//!
//! HTTP clients for the remote risk model and the topic ledger, plus the
//! local append-only audit log.

pub mod ledger;
pub mod model_api;

pub use ledger::*;
pub use model_api::*;
