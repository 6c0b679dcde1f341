//! Audit Ledger - local append-only log + optional topic ledger
//!
//! Every record is written as one JSON line to the local audit log. When the
//! topic ledger is configured, a compact message referencing the content hash
//! is submitted as well and the ledger transaction id becomes the correlation
//! id of the receipt.
//!
//! Neither path is allowed to fail the caller: `append` always returns a
//! receipt describing what happened.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::{AppError, AppResult, AuditRecord, LedgerConfig, LedgerMode, LedgerReceipt};
use crate::utils::constants::{
    LEDGER_BASE_RETRY_MS, LEDGER_MAX_ATTEMPTS, RETRY_JITTER_PERCENT, USER_AGENT as USER_AGENT_CONST,
};
use crate::utils::hashing::content_hash;

// ============================================
// Capability
// ============================================

/// Append-only evidence sink used by the scorer
#[async_trait]
pub trait LedgerRecorder: Send + Sync {
    /// Record one audit entry. Never fails; failures are described in the receipt.
    async fn append(&self, record: &AuditRecord) -> LedgerReceipt;
}

// ============================================
// Local audit log
// ============================================

/// One line of the local audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub logged_at: DateTime<Utc>,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    pub record: AuditRecord,
}

/// Result of re-checking a stored entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditVerification {
    pub correlation_id: String,
    /// Stored hash matches the hash recomputed from the stored record
    pub intact: bool,
    pub content_hash: String,
    pub recomputed_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    pub logged_at: DateTime<Utc>,
    pub record: AuditRecord,
}

/// JSONL file guarded by a single writer lock
pub struct LocalAuditLog {
    path: PathBuf,
    writer: Mutex<Option<File>>,
}

impl LocalAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    /// Append one entry as a single line. Lines from concurrent callers never interleave.
    pub async fn append(&self, entry: &AuditLogEntry) -> AppResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut guard = self.writer.lock().await;
        if guard.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            // An interrupted earlier write may have left an unterminated fragment
            if !ends_with_newline(&self.path).await? {
                line.insert(0, '\n');
            }
            *guard = Some(file);
        }

        let written = match guard.as_mut() {
            Some(file) => write_line(file, &line).await,
            None => Ok(()),
        };
        if let Err(e) = written {
            // Reopen on the next append
            *guard = None;
            return Err(e.into());
        }
        Ok(())
    }

    /// Find the newest entry whose content hash or ledger transaction id equals `correlation_id`
    pub async fn find(&self, correlation_id: &str) -> AppResult<Option<AuditLogEntry>> {
        // Hold the writer lock so a half-written line is never observed
        let _guard = self.writer.lock().await;
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let found = contents
            .lines()
            .rev()
            .filter_map(|line| serde_json::from_str::<AuditLogEntry>(line).ok())
            .find(|entry| {
                entry.content_hash == correlation_id
                    || entry.transaction_id.as_deref() == Some(correlation_id)
            });
        Ok(found)
    }

    /// Recompute the hash of a stored record and compare with what was logged
    pub async fn verify(&self, correlation_id: &str) -> AppResult<Option<AuditVerification>> {
        let Some(entry) = self.find(correlation_id).await? else {
            return Ok(None);
        };
        let recomputed_hash = content_hash(&entry.record)?;
        Ok(Some(AuditVerification {
            correlation_id: correlation_id.to_string(),
            intact: recomputed_hash == entry.content_hash,
            content_hash: entry.content_hash,
            recomputed_hash,
            transaction_id: entry.transaction_id,
            sequence_number: entry.sequence_number,
            logged_at: entry.logged_at,
            record: entry.record,
        }))
    }
}

/// Write one line. On failure the file is cut back to its previous length.
async fn write_line(file: &mut File, line: &str) -> std::io::Result<()> {
    let start = file.metadata().await?.len();
    let result = match file.write_all(line.as_bytes()).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        if let Err(e) = file.set_len(start).await {
            warn!("⚠️ Could not roll back partial audit line: {}", e);
        }
    }
    result
}

async fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = match File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    if file.metadata().await?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

// ============================================
// Topic ledger gateway
// ============================================

/// Compact message submitted to the topic. The full record stays local.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerMessage {
    pub content_hash: String,
    pub risk_level: String,
    pub risk_score: f64,
    pub chain: String,
    pub timestamp: DateTime<Utc>,
    pub schema_version: String,
}

impl LedgerMessage {
    pub fn new(content_hash: &str, record: &AuditRecord) -> Self {
        Self {
            content_hash: content_hash.to_string(),
            risk_level: record.verdict.risk_level.as_str().to_string(),
            risk_score: record.verdict.risk_score,
            chain: record.transaction.normalized_chain(),
            timestamp: record.timestamp_utc,
            schema_version: record.schema_version.clone(),
        }
    }
}

/// Gateway answer for an accepted message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerSubmission {
    pub transaction_id: String,
    #[serde(default)]
    pub sequence_number: Option<u64>,
}

/// HTTP client for `{gateway}/api/v1/topics/{topic_id}/messages`
pub struct TopicLedgerClient {
    client: reqwest::Client,
    endpoint: String,
    account_id: String,
    topic_id: String,
    explorer_url: Option<String>,
    max_attempts: u32,
    base_retry_ms: u64,
}

impl TopicLedgerClient {
    /// Returns `Ok(None)` when the ledger is not configured
    pub fn from_config(config: &LedgerConfig) -> Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }
        let (Some(account_id), Some(private_key), Some(topic_id)) = (
            config.account_id.as_deref(),
            config.private_key.as_deref(),
            config.topic_id.as_deref(),
        ) else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Account-Id",
            HeaderValue::from_str(account_id).map_err(|e| eyre!("Invalid LEDGER_ACCOUNT_ID: {}", e))?,
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", private_key))
            .map_err(|_| eyre!("LEDGER_PRIVATE_KEY is not a valid header value"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Some(Self {
            client,
            endpoint: format!(
                "{}/api/v1/topics/{}/messages",
                config.gateway_url.trim_end_matches('/'),
                topic_id
            ),
            account_id: account_id.to_string(),
            topic_id: topic_id.to_string(),
            explorer_url: config.explorer_url(),
            max_attempts: LEDGER_MAX_ATTEMPTS,
            base_retry_ms: LEDGER_BASE_RETRY_MS,
        }))
    }

    /// Override retry pacing (tests use a tiny base delay)
    pub fn with_retry(mut self, max_attempts: u32, base_retry_ms: u64) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_retry_ms = base_retry_ms;
        self
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn explorer_url(&self) -> Option<&str> {
        self.explorer_url.as_deref()
    }

    /// Submit with exponential backoff and jitter. Rejections and unusable
    /// answers are not retried.
    pub async fn submit(&self, message: &LedgerMessage) -> Result<LedgerSubmission> {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let base_delay = self.base_retry_ms * 2_u64.pow(attempt - 1);
                let jitter_range = (base_delay * RETRY_JITTER_PERCENT) / 100;
                let jitter: i64 =
                    rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
                let final_delay = (base_delay as i64 + jitter).max(0) as u64;

                debug!(
                    "⏳ Ledger retry {}/{} after {}ms",
                    attempt + 1,
                    self.max_attempts,
                    final_delay
                );
                tokio::time::sleep(Duration::from_millis(final_delay)).await;
            }

            match self.submit_once(message).await {
                Ok(submission) => return Ok(submission),
                Err(e) if !e.is_retryable() => {
                    warn!("⚠️ Ledger submission rejected, not retrying: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(
                        "⚠️ Ledger submission failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.max_attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Err(eyre!("Ledger submission failed")),
        }
    }

    async fn submit_once(&self, message: &LedgerMessage) -> AppResult<LedgerSubmission> {
        let response = self.client.post(&self.endpoint).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let submission: LedgerSubmission = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::invalid_response(format!("Failed to parse ledger response: {}", e))
        })?;
        if submission.transaction_id.trim().is_empty() {
            return Err(AppError::invalid_response(
                "Ledger response has an empty transaction_id",
            ));
        }
        Ok(submission)
    }
}

// ============================================
// Combined recorder
// ============================================

/// Local log first-class, topic ledger best-effort
pub struct AuditLedger {
    local: LocalAuditLog,
    remote: Option<TopicLedgerClient>,
}

impl AuditLedger {
    pub fn new(local: LocalAuditLog, remote: Option<TopicLedgerClient>) -> Self {
        Self { local, remote }
    }

    /// Local-only ledger writing to `path`
    pub fn local_only(path: impl Into<PathBuf>) -> Self {
        Self::new(LocalAuditLog::new(path), None)
    }

    /// Build from configuration. A broken remote config degrades to local-only.
    pub fn from_config(config: &LedgerConfig) -> Self {
        let remote = match TopicLedgerClient::from_config(config) {
            Ok(remote) => remote,
            Err(e) => {
                warn!("⚠️ Topic ledger disabled: {}", e);
                None
            }
        };
        info!(
            "📜 Audit log at {} ({})",
            config.audit_log_path.display(),
            if remote.is_some() { "remote + local" } else { "local only" }
        );
        Self::new(LocalAuditLog::new(config.audit_log_path.clone()), remote)
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Look up and re-hash a logged record
    pub async fn verify(&self, correlation_id: &str) -> AppResult<Option<AuditVerification>> {
        self.local.verify(correlation_id).await
    }
}

#[async_trait]
impl LedgerRecorder for AuditLedger {
    async fn append(&self, record: &AuditRecord) -> LedgerReceipt {
        let hash = match content_hash(record) {
            Ok(h) => h,
            Err(e) => {
                warn!("⚠️ Audit record could not be hashed: {}", e);
                return LedgerReceipt::unavailable(e.to_string());
            }
        };

        let mut errors = Vec::new();

        let submission = match &self.remote {
            Some(remote) => match remote.submit(&LedgerMessage::new(&hash, record)).await {
                Ok(s) => Some(s),
                Err(e) => {
                    errors.push(format!("ledger: {}", e));
                    None
                }
            },
            None => None,
        };

        let entry = AuditLogEntry {
            logged_at: Utc::now(),
            content_hash: hash.clone(),
            topic_id: self.remote.as_ref().map(|r| r.topic_id().to_string()),
            account_id: self.remote.as_ref().map(|r| r.account_id().to_string()),
            transaction_id: submission.as_ref().map(|s| s.transaction_id.clone()),
            sequence_number: submission.as_ref().and_then(|s| s.sequence_number),
            record: record.clone(),
        };
        let local_ok = match self.local.append(&entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Local audit log write failed: {}", e);
                errors.push(format!("local log: {}", e));
                false
            }
        };

        let receipt = match submission {
            Some(s) => LedgerReceipt {
                success: true,
                correlation_id: s.transaction_id.clone(),
                error: (!errors.is_empty()).then(|| errors.join("; ")),
                content_hash: hash,
                mode: LedgerMode::Remote,
                sequence_number: s.sequence_number,
                transaction_id: Some(s.transaction_id),
                explorer_url: self.remote.as_ref().and_then(|r| r.explorer_url().map(String::from)),
            },
            None => LedgerReceipt {
                success: local_ok,
                correlation_id: hash.clone(),
                error: (!errors.is_empty()).then(|| errors.join("; ")),
                content_hash: hash,
                mode: LedgerMode::LocalOnly,
                sequence_number: None,
                transaction_id: None,
                explorer_url: None,
            },
        };

        debug!(
            "📜 Audit entry {} ({:?}, success={})",
            receipt.correlation_id, receipt.mode, receipt.success
        );
        receipt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskVerdict, TransactionDescriptor};
    use chrono::TimeZone;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(value: f64) -> AuditRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let tx = TransactionDescriptor::new("ethereum", "0x000000000000000000000000000000000000dead", value);
        AuditRecord::at(ts, &tx, &RiskVerdict::known_scam(&tx.normalized_to_address()))
    }

    fn ledger_config(gateway: &str, log: &Path) -> LedgerConfig {
        LedgerConfig {
            account_id: Some("0.0.1001".into()),
            private_key: Some("test-key".into()),
            topic_id: Some("0.0.4242".into()),
            gateway_url: gateway.to_string(),
            timeout: Duration::from_secs(2),
            audit_log_path: log.to_path_buf(),
            ..LedgerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_local_only_correlation_is_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AuditLedger::local_only(dir.path().join("audit.jsonl"));

        let a = ledger.append(&record(1000.0)).await;
        let b = ledger.append(&record(1000.0)).await;
        let c = ledger.append(&record(1001.0)).await;

        assert!(a.success);
        assert_eq!(a.mode, LedgerMode::LocalOnly);
        assert_eq!(a.correlation_id, a.content_hash);
        assert_eq!(a.correlation_id, b.correlation_id);
        assert_ne!(a.correlation_id, c.correlation_id);

        let contents = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_ledger_degrades_to_local() {
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) on localhost: connection refused
        let config = ledger_config("http://127.0.0.1:9", &dir.path().join("audit.jsonl"));
        let remote = TopicLedgerClient::from_config(&config).unwrap().unwrap().with_retry(2, 1);
        let ledger = AuditLedger::new(LocalAuditLog::new(&config.audit_log_path), Some(remote));

        let a = ledger.append(&record(5.0)).await;
        let b = ledger.append(&record(5.0)).await;
        assert!(a.success);
        assert_eq!(a.mode, LedgerMode::LocalOnly);
        assert_eq!(a.correlation_id, a.content_hash);
        assert_eq!(a.correlation_id, b.correlation_id);
        assert!(a.error.as_deref().unwrap_or_default().contains("ledger"));
    }

    #[tokio::test]
    async fn test_remote_success_uses_transaction_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/topics/0.0.4242/messages"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "transaction_id": "0.0.1001@1714564800.000000001",
                "sequence_number": 17
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = ledger_config(&server.uri(), &dir.path().join("audit.jsonl"));
        let ledger = AuditLedger::from_config(&config);
        assert!(ledger.is_remote_enabled());

        let receipt = ledger.append(&record(1.0)).await;
        assert!(receipt.success);
        assert_eq!(receipt.mode, LedgerMode::Remote);
        assert_eq!(receipt.correlation_id, "0.0.1001@1714564800.000000001");
        assert_eq!(receipt.sequence_number, Some(17));
        assert_eq!(
            receipt.explorer_url.as_deref(),
            Some("https://hashscan.io/testnet/topic/0.0.4242")
        );

        // Findable by either id
        let by_tx = ledger.verify(&receipt.correlation_id).await.unwrap().unwrap();
        let by_hash = ledger.verify(&receipt.content_hash).await.unwrap().unwrap();
        assert!(by_tx.intact);
        assert_eq!(by_tx.content_hash, by_hash.content_hash);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"transaction_id": "tx-2"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = ledger_config(&server.uri(), &dir.path().join("audit.jsonl"));
        let remote = TopicLedgerClient::from_config(&config).unwrap().unwrap().with_retry(3, 1);
        let ledger = AuditLedger::new(LocalAuditLog::new(&config.audit_log_path), Some(remote));

        let receipt = ledger.append(&record(2.0)).await;
        assert_eq!(receipt.correlation_id, "tx-2");
        assert_eq!(receipt.sequence_number, None);
        assert!(receipt.error.is_none());
    }

    #[tokio::test]
    async fn test_rejected_submission_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = ledger_config(&server.uri(), &dir.path().join("audit.jsonl"));
        let remote = TopicLedgerClient::from_config(&config).unwrap().unwrap().with_retry(3, 1);
        let ledger = AuditLedger::new(LocalAuditLog::new(&config.audit_log_path), Some(remote));

        let receipt = ledger.append(&record(6.0)).await;
        assert!(receipt.success);
        assert_eq!(receipt.mode, LedgerMode::LocalOnly);
        assert_eq!(receipt.correlation_id, receipt.content_hash);
        assert!(receipt.error.as_deref().unwrap_or_default().contains("UPSTREAM_REJECTED"));
    }

    #[tokio::test]
    async fn test_empty_transaction_id_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"transaction_id": " "})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = ledger_config(&server.uri(), &dir.path().join("audit.jsonl"));
        let remote = TopicLedgerClient::from_config(&config).unwrap().unwrap().with_retry(3, 1);

        let err = remote.submit(&LedgerMessage::new("abc", &record(7.0))).await.unwrap_err();
        assert!(err.to_string().contains("UPSTREAM_INVALID_RESPONSE"));
    }

    #[tokio::test]
    async fn test_verify_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");
        let ledger = AuditLedger::local_only(&log_path);
        let receipt = ledger.append(&record(3.0)).await;

        let ok = ledger.verify(&receipt.correlation_id).await.unwrap().unwrap();
        assert!(ok.intact);
        assert!(ledger.verify("no-such-id").await.unwrap().is_none());

        let contents = std::fs::read_to_string(&log_path).unwrap();
        std::fs::write(&log_path, contents.replace("\"value\":3.0", "\"value\":4.0")).unwrap();
        let tampered = LocalAuditLog::new(&log_path)
            .verify(&receipt.correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!tampered.intact);
    }

    #[tokio::test]
    async fn test_append_after_unterminated_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");
        std::fs::write(&log_path, "{\"logged_at\":\"2024-05-01T12:").unwrap();

        let ledger = AuditLedger::local_only(&log_path);
        let first = ledger.append(&record(8.0)).await;
        let second = ledger.append(&record(9.0)).await;
        assert!(first.success && second.success);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(serde_json::from_str::<AuditLogEntry>(lines[0]).is_err());
        for line in &lines[1..] {
            serde_json::from_str::<AuditLogEntry>(line).unwrap();
        }
        assert!(ledger.verify(&first.correlation_id).await.unwrap().unwrap().intact);
    }

    #[tokio::test]
    async fn test_missing_log_file_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalAuditLog::new(dir.path().join("absent.jsonl"));
        assert!(log.find("anything").await.unwrap().is_none());
    }
}
