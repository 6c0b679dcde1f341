//! Risk Model Module
//!
//! Scoring backends behind one capability trait. The remote backend is an
//! HTTP model service; the local backend is a deterministic weighted feature
//! vector that is also used whenever the remote one is unavailable.
//!
//! Local features (each in [0, 1]):
//! 1. value    - transaction value relative to `VALUE_CAP`
//! 2. entropy  - Shannon entropy of the recipient address
//! 3. chain    - static per-chain weight
//! 4. contract - call payload present
//! 5. time     - transaction submitted during quiet hours

use async_trait::async_trait;
use chrono::Timelike;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{
    normalize_address, AppError, ModelAssessment, ModelConfig, ScoreSource, TransactionDescriptor,
};
use crate::providers::model_api::ModelApiClient;
use crate::utils::constants::{
    chain_risk_weight, HEURISTIC_WEIGHTS, MAX_ENTROPY_BITS, NEUTRAL_ENTROPY, QUIET_HOURS_END,
    QUIET_HOURS_START, VALUE_CAP,
};

// ============================================
// CAPABILITY
// ============================================

/// Scoring backend. `analyze` never fails: backends absorb their own
/// upstream errors and fall back.
#[async_trait]
pub trait RiskModel: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, tx: &TransactionDescriptor) -> ModelAssessment;
}

// ============================================
// FEATURE EXTRACTION
// ============================================

/// Shannon entropy of the characters of `s`, in bits
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum::<f64>()
        .max(0.0)
}

/// Address entropy normalized to [0, 1]; empty address is neutral
pub fn address_entropy(address: &str) -> f64 {
    let normalized = normalize_address(address);
    if normalized.is_empty() {
        return NEUTRAL_ENTROPY;
    }
    (shannon_entropy(&normalized) / MAX_ENTROPY_BITS).clamp(0.0, 1.0)
}

/// Quiet hours: before 06:00 or after 22:59
#[inline]
pub fn is_unusual_hour(hour: u32) -> bool {
    hour < QUIET_HOURS_START || hour > QUIET_HOURS_END
}

/// Feature vector of the local heuristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeuristicFeatures {
    pub value: f64,
    pub entropy: f64,
    pub chain: f64,
    pub contract: f64,
    pub time: f64,
}

impl HeuristicFeatures {
    pub fn extract(tx: &TransactionDescriptor, hour: u32) -> Self {
        let value = if tx.value.is_nan() {
            0.0
        } else {
            (tx.value / VALUE_CAP).clamp(0.0, 1.0)
        };
        Self {
            value,
            entropy: address_entropy(&tx.to_address),
            chain: chain_risk_weight(&tx.chain),
            contract: if tx.has_contract_payload() { 1.0 } else { 0.0 },
            time: if is_unusual_hour(hour) { 1.0 } else { 0.0 },
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.value, self.entropy, self.chain, self.contract, self.time]
    }

    /// dot(weights, features), clamped
    pub fn score(&self) -> f64 {
        self.as_array()
            .iter()
            .zip(HEURISTIC_WEIGHTS.iter())
            .map(|(f, w)| f * w)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Human-readable factors, in feature order
    pub fn factors(&self) -> Vec<String> {
        let mut factors = Vec::new();
        if self.value >= 0.5 {
            factors.push("Large transaction amount".to_string());
        }
        if self.entropy >= 0.9 {
            factors.push("High address entropy".to_string());
        }
        if self.chain >= 0.6 {
            factors.push("High-risk chain".to_string());
        }
        if self.contract > 0.0 {
            factors.push("Contract interaction".to_string());
        }
        if self.time > 0.0 {
            factors.push("Unusual transaction hour".to_string());
        }
        factors
    }
}

// ============================================
// LOCAL HEURISTIC
// ============================================

/// Deterministic, dependency-free scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHeuristicModel {
    /// Fixed hour for reproducible scoring; wall clock when `None`
    fixed_hour: Option<u32>,
}

impl LocalHeuristicModel {
    pub fn new() -> Self {
        Self { fixed_hour: None }
    }

    pub fn with_fixed_hour(hour: u32) -> Self {
        Self {
            fixed_hour: Some(hour % 24),
        }
    }

    fn current_hour(&self) -> u32 {
        self.fixed_hour
            .unwrap_or_else(|| chrono::Local::now().hour())
    }

    /// Score as if submitted at local `hour`
    pub fn analyze_at(&self, tx: &TransactionDescriptor, hour: u32) -> ModelAssessment {
        let features = HeuristicFeatures::extract(tx, hour);
        let risk_score = features.score();
        debug!("🧮 Heuristic features {:?} → {:.3}", features.as_array(), risk_score);

        let mut details = Map::new();
        if let Ok(Value::Object(feature_map)) = serde_json::to_value(features) {
            details.insert("features".to_string(), Value::Object(feature_map));
        }
        details.insert("hour".to_string(), Value::from(hour));

        ModelAssessment {
            risk_score,
            factors: features.factors(),
            source: ScoreSource::LocalFallback,
            details,
        }
    }

    /// Score using the configured or current hour
    pub fn assess(&self, tx: &TransactionDescriptor) -> ModelAssessment {
        self.analyze_at(tx, self.current_hour())
    }
}

#[async_trait]
impl RiskModel for LocalHeuristicModel {
    fn name(&self) -> &'static str {
        "local-heuristic"
    }

    async fn analyze(&self, tx: &TransactionDescriptor) -> ModelAssessment {
        self.assess(tx)
    }
}

// ============================================
// REMOTE MODEL WITH FALLBACK
// ============================================

/// HTTP scoring backend; any failure degrades to the local heuristic
pub struct RemoteRiskModel {
    client: Result<ModelApiClient, String>,
    local: LocalHeuristicModel,
}

impl RemoteRiskModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_local(config, LocalHeuristicModel::new())
    }

    /// Use a specific local fallback (tests pin its hour)
    pub fn with_local(config: &ModelConfig, local: LocalHeuristicModel) -> Self {
        let client = match config.api_key.as_deref() {
            Some(key) if config.has_credentials() => {
                ModelApiClient::new(&config.base_url, key, config.timeout).map_err(|e| e.to_string())
            }
            _ => Err(AppError::not_configured("Risk model").to_string()),
        };
        Self { client, local }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_ok()
    }

    fn fallback(&self, tx: &TransactionDescriptor, reason: String) -> ModelAssessment {
        let mut assessment = self.local.assess(tx);
        assessment
            .details
            .insert("fallback_reason".to_string(), Value::from(reason));
        assessment
    }
}

#[async_trait]
impl RiskModel for RemoteRiskModel {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, tx: &TransactionDescriptor) -> ModelAssessment {
        let client = match &self.client {
            Ok(client) => client,
            Err(reason) => return self.fallback(tx, reason.clone()),
        };

        match client.analyze(tx).await {
            Ok(analysis) => ModelAssessment {
                risk_score: analysis.risk_score.clamp(0.0, 1.0),
                factors: analysis.factors,
                source: ScoreSource::Remote,
                details: analysis.extra,
            },
            Err(e) => {
                warn!("⚠️ Remote model unavailable, using local heuristic: {}", e);
                self.fallback(tx, e.to_string())
            }
        }
    }
}

/// Pick the backend once, at startup
pub fn build_risk_model(config: &ModelConfig) -> Arc<dyn RiskModel> {
    if config.api_key.is_none() {
        info!("🧮 Risk model: local heuristic");
        return Arc::new(LocalHeuristicModel::new());
    }
    let remote = RemoteRiskModel::new(config);
    if remote.is_configured() {
        info!("🤖 Risk model: remote ({})", config.base_url);
    } else {
        warn!("⚠️ Risk model credentials unusable, every call will fall back to the local heuristic");
    }
    Arc::new(remote)
}
