//! Risk Scorer - denylist, then model, then audit
//!
//! Pipeline for one transaction:
//! 1. Normalize the recipient and check the denylist (CRITICAL, model skipped)
//! 2. Otherwise ask the risk model, clamp, derive the level from the thresholds
//! 3. Append an audit record and return the verdict with its receipt
//!
//! Anything unexpected in steps 1-2 (a panic in a collaborator, a non-finite
//! score) becomes an ERROR verdict. The caller always gets a verdict.

use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

use super::classifier::AddressClassifier;
use super::risk_model::RiskModel;
use crate::models::{
    AppError, AppResult, AuditRecord, ModelAssessment, RiskThresholds, RiskVerdict,
    ScoredTransaction, TransactionDescriptor,
};
use crate::providers::ledger::LedgerRecorder;

/// Shared, read-only orchestrator. Clone the `Arc`, not the scorer.
pub struct RiskScorer {
    classifier: AddressClassifier,
    model: Arc<dyn RiskModel>,
    ledger: Arc<dyn LedgerRecorder>,
    thresholds: RiskThresholds,
}

impl RiskScorer {
    pub fn new(model: Arc<dyn RiskModel>, ledger: Arc<dyn LedgerRecorder>) -> Self {
        Self {
            classifier: AddressClassifier::new(),
            model,
            ledger,
            thresholds: RiskThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn classifier(&self) -> &AddressClassifier {
        &self.classifier
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Verdict only, no audit entry
    pub async fn assess(&self, tx: &TransactionDescriptor) -> RiskVerdict {
        let outcome = AssertUnwindSafe(self.try_assess(tx)).catch_unwind().await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => Err(AppError::internal_scoring(format!(
                "risk pipeline panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        match result {
            Ok(verdict) => verdict,
            Err(e) => {
                error!("❌ [{}] Scoring failed for {} transaction: {}", e.code_str(), tx.chain, e.message);
                // Nothing was scored before the failure, so the last known score is 0
                RiskVerdict::scoring_error(0.0, &e)
            }
        }
    }

    /// Verdict plus exactly one audit append
    pub async fn score(&self, tx: &TransactionDescriptor) -> ScoredTransaction {
        let verdict = self.assess(tx).await;
        let record = AuditRecord::new(tx, &verdict);
        let receipt = self.ledger.append(&record).await;

        info!(
            "{} {} → {} | audit {} ({})",
            verdict.risk_level.emoji(),
            tx.normalized_chain(),
            verdict.summary(),
            receipt.audit_reference(),
            if receipt.success { "ok" } else { "failed" }
        );

        ScoredTransaction { verdict, receipt }
    }

    async fn try_assess(&self, tx: &TransactionDescriptor) -> AppResult<RiskVerdict> {
        let address = tx.normalized_to_address();
        if self.classifier.classify(&address).is_known_scam {
            info!("💀 Denylisted recipient, model skipped");
            return Ok(RiskVerdict::known_scam(&address));
        }

        let assessment = self.model.analyze(tx).await;
        self.verdict_from(assessment)
    }

    fn verdict_from(&self, assessment: ModelAssessment) -> AppResult<RiskVerdict> {
        let ModelAssessment {
            risk_score,
            factors,
            source,
            details,
        } = assessment;

        if !risk_score.is_finite() {
            return Err(AppError::internal_scoring(format!(
                "model returned a non-finite score ({})",
                risk_score
            )));
        }

        let risk_score = risk_score.clamp(0.0, 1.0);
        let mut source_details = details;
        source_details.insert("source".to_string(), Value::from(source.as_str()));

        Ok(RiskVerdict {
            risk_score,
            risk_level: self.thresholds.level_for(risk_score),
            factors,
            source_details,
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
