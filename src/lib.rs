//! TxSentinel Library
//!
//! Scam-risk scoring for blockchain transactions with a verifiable audit trail:
//! - Denylist fast path for known scam addresses
//! - Remote risk model with a deterministic local fallback
//! - Append-only audit log, optionally anchored to a topic ledger
//! - HTTP tool gateway (`sentinel_api`) and one-shot CLI (`tx_sentinel`)

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    build_risk_model, AddressClassifier, LocalHeuristicModel, RemoteRiskModel, RiskModel,
    RiskScorer,
};
pub use models::{
    AppError, AppResult, AuditRecord, ErrorCode, LedgerReceipt, RiskLevel, RiskThresholds,
    RiskVerdict, ScoredTransaction, SentinelConfig, TransactionDescriptor,
};
pub use providers::{AuditLedger, LedgerRecorder, LocalAuditLog, TopicLedgerClient};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
