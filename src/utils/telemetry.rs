//! Telemetry Module
//!
//! Aggregate counters for the scoring pipeline: verdicts per level, how often
//! the model fell back to the local heuristic, and how often the ledger could
//! not be reached. No addresses or payloads are kept.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{LedgerMode, RiskLevel, ScoredTransaction};

/// Snapshot of the collector
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Total transactions scored
    pub total_scored: u64,
    /// Verdicts by level name
    pub verdicts_by_level: HashMap<String, u64>,
    /// Verdicts produced by the local heuristic
    pub model_fallbacks: u64,
    /// Receipts that did not reach the distributed ledger
    pub ledger_local_only: u64,
    /// Receipts with success = false
    pub audit_failures: u64,
    /// Average end-to-end scoring latency (ms)
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl TelemetryStats {
    /// Count for one level
    pub fn level_count(&self, level: RiskLevel) -> u64 {
        self.verdicts_by_level
            .get(level.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Lock-light collector shared by all request handlers
pub struct TelemetryCollector {
    total_scored: AtomicU64,
    model_fallbacks: AtomicU64,
    ledger_local_only: AtomicU64,
    audit_failures: AtomicU64,
    total_latency_ms: AtomicU64,
    level_counts: RwLock<HashMap<RiskLevel, u64>>,
    session_start: u64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_scored: AtomicU64::new(0),
            model_fallbacks: AtomicU64::new(0),
            ledger_local_only: AtomicU64::new(0),
            audit_failures: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            level_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
        }
    }

    /// Record one completed scoring call
    pub fn record(&self, scored: &ScoredTransaction, latency_ms: u64) {
        self.total_scored.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        let fell_back = scored
            .verdict
            .source_details
            .get("source")
            .and_then(|v| v.as_str())
            == Some("LOCAL_FALLBACK");
        if fell_back {
            self.model_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        if scored.receipt.mode == LedgerMode::LocalOnly {
            self.ledger_local_only.fetch_add(1, Ordering::Relaxed);
        }
        if !scored.receipt.success {
            self.audit_failures.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.level_counts.write() {
            *counts.entry(scored.verdict.risk_level).or_insert(0) += 1;
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_scored = self.total_scored.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        let avg_latency_ms = if total_scored > 0 {
            total_latency as f64 / total_scored as f64
        } else {
            0.0
        };

        let verdicts_by_level = self
            .level_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_scored,
            verdicts_by_level,
            model_fallbacks: self.model_fallbacks.load(Ordering::Relaxed),
            ledger_local_only: self.ledger_local_only.load(Ordering::Relaxed),
            audit_failures: self.audit_failures.load(Ordering::Relaxed),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Write the current snapshot to `dir/stats_<ts>.json`
    pub fn export_stats_json(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let path = dir.join(format!("stats_{}.json", current_timestamp()));
        fs::write(&path, stats.to_json())?;
        Ok(path)
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
