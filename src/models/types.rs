//! Type definitions for the scoring pipeline
//! All core data structures flowing between classifier, model, scorer and ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{AppError, AppResult};
use crate::utils::constants::{AUDIT_SCHEMA_VERSION, AUDIT_UNAVAILABLE};

// ============================================
// Inbound transaction
// ============================================

/// Transaction description supplied by the tool caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    /// Chain name (e.g. "ethereum", "hedera")
    pub chain: String,
    /// Recipient address
    pub to_address: String,
    /// Sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    /// Amount in native currency
    pub value: f64,
    /// Opaque call payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl TransactionDescriptor {
    pub fn new(chain: impl Into<String>, to_address: impl Into<String>, value: f64) -> Self {
        Self {
            chain: chain.into(),
            to_address: to_address.into(),
            from_address: None,
            value,
            data: None,
        }
    }

    pub fn with_from(mut self, from_address: impl Into<String>) -> Self {
        self.from_address = Some(from_address.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Reject descriptors the scorer must never see
    pub fn validate(&self) -> AppResult<()> {
        if self.chain.trim().is_empty() {
            return Err(AppError::missing_field("chain"));
        }
        if self.to_address.trim().is_empty() {
            return Err(AppError::missing_field("to_address"));
        }
        if !self.value.is_finite() {
            return Err(AppError::invalid_value("value", "must be a finite number"));
        }
        if self.value < 0.0 {
            return Err(AppError::invalid_value("value", "must be non-negative"));
        }
        Ok(())
    }

    /// Recipient address, trimmed and lowercased
    pub fn normalized_to_address(&self) -> String {
        normalize_address(&self.to_address)
    }

    /// Chain name, trimmed and lowercased
    pub fn normalized_chain(&self) -> String {
        self.chain.trim().to_lowercase()
    }

    /// Whether the transaction carries a call payload (contract interaction)
    pub fn has_contract_payload(&self) -> bool {
        self.data
            .as_deref()
            .map(str::trim)
            .map(|d| !d.is_empty() && !d.eq_ignore_ascii_case("0x"))
            .unwrap_or(false)
    }
}

/// Canonical address form used for every denylist lookup
#[inline]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

// ============================================
// Risk levels & thresholds
// ============================================

/// Risk level classification for transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// Reserved for deterministic denylist hits unless a critical threshold is configured
    Critical,
    Unknown,
    /// The scorer itself failed
    Error,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 6] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
        RiskLevel::Unknown,
        RiskLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unknown => "UNKNOWN",
            RiskLevel::Error => "ERROR",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "✅",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
            RiskLevel::Critical => "💀",
            RiskLevel::Unknown => "❓",
            RiskLevel::Error => "⚠️",
        }
    }

    /// Parse a caller-supplied level name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Levels that should steer a caller away from the transaction
    pub fn is_dangerous(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

/// Score → level table. Comparisons are strict: a score equal to a bound
/// stays in the lower tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// score > medium → MEDIUM
    pub medium: f64,
    /// score > high → HIGH
    pub high: f64,
    /// score > critical → CRITICAL (model path only when set)
    pub critical: Option<f64>,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.5,
            high: 0.8,
            critical: None,
        }
    }
}

impl RiskThresholds {
    pub fn with_critical(mut self, critical: f64) -> Self {
        self.critical = Some(critical);
        self
    }

    pub fn level_for(&self, score: f64) -> RiskLevel {
        match self.critical {
            Some(critical) if score > critical => RiskLevel::Critical,
            _ if score > self.high => RiskLevel::High,
            _ if score > self.medium => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

// ============================================
// Model output
// ============================================

/// Where a score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreSource {
    /// Static denylist hit
    Denylist,
    /// Remote scoring backend
    Remote,
    /// Deterministic local heuristic
    LocalFallback,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Denylist => "DENYLIST",
            ScoreSource::Remote => "REMOTE",
            ScoreSource::LocalFallback => "LOCAL_FALLBACK",
        }
    }
}

/// Result of `RiskModel::analyze`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAssessment {
    pub risk_score: f64,
    pub factors: Vec<String>,
    pub source: ScoreSource,
    /// Auxiliary backend fields (feature values, fallback reason, ...)
    pub details: Map<String, Value>,
}

// ============================================
// Verdict
// ============================================

/// Output classification + score + explanation for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub source_details: Map<String, Value>,
}

impl RiskVerdict {
    /// Denylist short-circuit verdict
    pub fn known_scam(normalized_address: &str) -> Self {
        let mut source_details = Map::new();
        source_details.insert("source".into(), Value::from(ScoreSource::Denylist.as_str()));
        source_details.insert("reason".into(), Value::from("Known scam address"));
        source_details.insert("address".into(), Value::from(normalized_address));
        Self {
            risk_score: 1.0,
            risk_level: RiskLevel::Critical,
            factors: vec!["Known scam address".to_string()],
            source_details,
        }
    }

    /// Verdict for an internal scoring failure. The score stays at whatever
    /// was last known when the failure happened.
    pub fn scoring_error(last_score: f64, error: &AppError) -> Self {
        let mut source_details = Map::new();
        source_details.insert("error".into(), Value::from(error.to_string()));
        source_details.insert("error_code".into(), Value::from(error.code_str()));
        let risk_score = if last_score.is_finite() {
            last_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            risk_score,
            risk_level: RiskLevel::Error,
            factors: vec![format!("Scoring failed: {}", error.message)],
            source_details,
        }
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "{} {} ({:.3}) [{}]",
            self.risk_level.emoji(),
            self.risk_level.as_str(),
            self.risk_score,
            self.factors.join("; ")
        )
    }
}

// ============================================
// Audit trail
// ============================================

/// Immutable evidence that a transaction was scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp_utc: DateTime<Utc>,
    pub transaction: TransactionDescriptor,
    pub verdict: RiskVerdict,
    pub schema_version: String,
}

impl AuditRecord {
    pub fn new(transaction: &TransactionDescriptor, verdict: &RiskVerdict) -> Self {
        Self::at(Utc::now(), transaction, verdict)
    }

    /// Record with an explicit timestamp
    pub fn at(
        timestamp_utc: DateTime<Utc>,
        transaction: &TransactionDescriptor,
        verdict: &RiskVerdict,
    ) -> Self {
        Self {
            timestamp_utc,
            transaction: transaction.clone(),
            verdict: verdict.clone(),
            schema_version: AUDIT_SCHEMA_VERSION.to_string(),
        }
    }
}

/// How a receipt was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerMode {
    /// Submitted to the distributed ledger
    Remote,
    /// Only written to the local append-only log
    LocalOnly,
}

/// Outcome of `LedgerRecorder::append`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub success: bool,
    /// Ledger transaction id when available, else the content hash
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub content_hash: String,
    pub mode: LedgerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl LedgerReceipt {
    /// Receipt for a record that could not even be hashed
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            success: false,
            correlation_id: AUDIT_UNAVAILABLE.to_string(),
            error: Some(error.into()),
            content_hash: String::new(),
            mode: LedgerMode::LocalOnly,
            sequence_number: None,
            transaction_id: None,
            explorer_url: None,
        }
    }

    /// Correlation id to hand back to the caller
    pub fn audit_reference(&self) -> &str {
        if self.correlation_id.is_empty() {
            AUDIT_UNAVAILABLE
        } else {
            &self.correlation_id
        }
    }
}

/// Verdict plus the receipt of its audit entry
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTransaction {
    pub verdict: RiskVerdict,
    pub receipt: LedgerReceipt,
}
