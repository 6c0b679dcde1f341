//! End-to-end tests for the scoring pipeline: denylist, model fallback, audit trail

use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tx_sentinel::models::{LedgerMode, ModelConfig, RiskLevel, ScoreSource};
use tx_sentinel::{
    AuditLedger, LocalHeuristicModel, RemoteRiskModel, RiskScorer, TransactionDescriptor,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCAM: &str = "0x000000000000000000000000000000000000dEaD";

fn model_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        api_key: Some("sk_live_test".to_string()),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
        ..ModelConfig::default()
    }
}

fn remote_scorer(base_url: &str, ledger: Arc<AuditLedger>) -> RiskScorer {
    let model = RemoteRiskModel::with_local(
        &model_config(base_url),
        LocalHeuristicModel::with_fixed_hour(12),
    );
    RiskScorer::new(Arc::new(model), ledger)
}

fn hedera_tx() -> TransactionDescriptor {
    TransactionDescriptor::new("hedera", "0.0.12345", 10.0)
}

fn source_of(details: &serde_json::Map<String, Value>) -> &str {
    details.get("source").and_then(Value::as_str).unwrap_or_default()
}

// ============================================
// Denylist
// ============================================

#[tokio::test]
async fn test_denylisted_recipient_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));
    let scorer = RiskScorer::new(Arc::new(LocalHeuristicModel::with_fixed_hour(12)), ledger);

    let scored = scorer
        .score(&TransactionDescriptor::new("ethereum", SCAM, 1000.0))
        .await;

    assert_eq!(scored.verdict.risk_level, RiskLevel::Critical);
    assert_eq!(scored.verdict.risk_score, 1.0);
    assert!(scored.verdict.factors.iter().any(|f| f == "Known scam address"));
    assert_eq!(source_of(&scored.verdict.source_details), ScoreSource::Denylist.as_str());
    assert!(scored.receipt.success);
    assert_eq!(scored.receipt.mode, LedgerMode::LocalOnly);
    assert_eq!(scored.receipt.correlation_id.len(), 64);
}

#[tokio::test]
async fn test_denylist_never_consults_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis/transaction"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));
    let scorer = remote_scorer(&server.uri(), ledger);

    for address in [SCAM, "  0x000000000000000000000000000000000000DEAD  "] {
        let verdict = scorer
            .assess(&TransactionDescriptor::new("ethereum", address, 0.0))
            .await;
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
        assert_eq!(verdict.risk_score, 1.0);
    }
}

// ============================================
// Remote model and fallback
// ============================================

#[tokio::test]
async fn test_remote_model_score_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"risk_score": 0.9, "factors": ["Fresh contract", "Drainer pattern"], "model": "v3"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));
    let scorer = remote_scorer(&server.uri(), ledger);

    let verdict = scorer.assess(&hedera_tx()).await;
    assert_eq!(verdict.risk_level, RiskLevel::High);
    assert_eq!(verdict.risk_score, 0.9);
    assert_eq!(verdict.factors.len(), 2);
    assert_eq!(source_of(&verdict.source_details), "REMOTE");
    assert_eq!(verdict.source_details.get("model"), Some(&json!("v3")));
}

#[tokio::test]
async fn test_remote_failures_fall_back_to_local_heuristic() {
    let error_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&error_server)
        .await;

    let garbage_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&garbage_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));
    let local_score = LocalHeuristicModel::with_fixed_hour(12)
        .assess(&hedera_tx())
        .risk_score;

    // Nothing listens on port 9
    let backends = ["http://127.0.0.1:9".to_string(), error_server.uri(), garbage_server.uri()];
    for base_url in backends {
        let scorer = remote_scorer(&base_url, ledger.clone());
        let scored = scorer.score(&hedera_tx()).await;
        let verdict = &scored.verdict;

        assert!(
            matches!(verdict.risk_level, RiskLevel::Low | RiskLevel::Medium),
            "{}: {:?}",
            base_url,
            verdict.risk_level
        );
        assert!((0.0..=1.0).contains(&verdict.risk_score));
        assert!((verdict.risk_score - local_score).abs() < 1e-12);
        assert_eq!(source_of(&verdict.source_details), "LOCAL_FALLBACK");
        assert!(verdict.source_details.contains_key("fallback_reason"));
        assert!(scored.receipt.success, "audit entry must still be written");
    }
}

#[tokio::test]
async fn test_non_finite_remote_score_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));

    for body in [json!({"risk_score": "NaN"}), json!({"result": {"risk_score": "inf"}})] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analysis/transaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = remote_scorer(&server.uri(), ledger.clone())
            .assess(&hedera_tx())
            .await;
        assert!(
            matches!(verdict.risk_level, RiskLevel::Low | RiskLevel::Medium),
            "{}: {:?}",
            body,
            verdict.risk_level
        );
        assert!((0.0..=1.0).contains(&verdict.risk_score));
        assert_eq!(source_of(&verdict.source_details), "LOCAL_FALLBACK");
        let reason = verdict.source_details["fallback_reason"].as_str().unwrap();
        assert!(reason.contains("UPSTREAM_INVALID_RESPONSE"), "{}", reason);
    }
}

#[tokio::test]
async fn test_placeholder_key_falls_back_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(AuditLedger::local_only(dir.path().join("audit.jsonl")));
    let config = ModelConfig {
        api_key: Some("YOUR_API_KEY".to_string()),
        ..ModelConfig::default()
    };
    let model = RemoteRiskModel::with_local(&config, LocalHeuristicModel::with_fixed_hour(12));
    assert!(!model.is_configured());

    let verdict = RiskScorer::new(Arc::new(model), ledger).assess(&hedera_tx()).await;
    assert_eq!(source_of(&verdict.source_details), "LOCAL_FALLBACK");
    let reason = verdict.source_details["fallback_reason"].as_str().unwrap();
    assert!(reason.contains("UPSTREAM_NOT_CONFIGURED"), "{}", reason);
}

// ============================================
// Audit trail
// ============================================

#[tokio::test]
async fn test_concurrent_scoring_writes_one_line_each() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("nested").join("audit.jsonl");
    let ledger = Arc::new(AuditLedger::local_only(&log_path));
    let scorer = Arc::new(RiskScorer::new(
        Arc::new(LocalHeuristicModel::with_fixed_hour(3)),
        ledger.clone(),
    ));

    let tasks = (0..50).map(|i| {
        let scorer = scorer.clone();
        tokio::spawn(async move {
            let tx = if i % 5 == 0 {
                TransactionDescriptor::new("ethereum", SCAM, i as f64)
            } else {
                TransactionDescriptor::new("polygon", format!("0xabc{:04}", i), i as f64 * 100.0)
                    .with_data("0xa9059cbb")
            };
            scorer.score(&tx).await
        })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.len(), 50);
    assert!(results.iter().all(|s| s.receipt.success));
    assert_eq!(
        results
            .iter()
            .filter(|s| s.verdict.risk_level == RiskLevel::Critical)
            .count(),
        10
    );

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 50);
    for line in lines {
        let entry: Value = serde_json::from_str(line).expect("every line is a complete JSON object");
        assert_eq!(entry["content_hash"].as_str().unwrap().len(), 64);
    }

    // Every receipt resolves back to an intact entry
    let sample = &results[7].receipt;
    let verification = ledger.verify(sample.audit_reference()).await.unwrap().unwrap();
    assert!(verification.intact);
    assert_eq!(verification.content_hash, sample.content_hash);
}

#[tokio::test]
async fn test_scoring_and_audit_survive_unreachable_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let config = tx_sentinel::models::LedgerConfig {
        account_id: Some("0.0.1001".to_string()),
        private_key: Some("302e020100300506032b657004220420aa".to_string()),
        topic_id: Some("0.0.4242".to_string()),
        gateway_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(500),
        audit_log_path: dir.path().join("audit.jsonl"),
        ..tx_sentinel::models::LedgerConfig::default()
    };
    let ledger = Arc::new(AuditLedger::from_config(&config));
    let scorer = RiskScorer::new(Arc::new(LocalHeuristicModel::with_fixed_hour(12)), ledger);

    let scored = scorer.score(&hedera_tx()).await;
    assert_eq!(scored.verdict.risk_level, RiskLevel::Low);
    assert_eq!(scored.receipt.mode, LedgerMode::LocalOnly);
    assert!(scored.receipt.success);
    assert!(scored.receipt.error.is_some());
    assert_eq!(scored.receipt.correlation_id, scored.receipt.content_hash);
}
