//! Configuration module for TxSentinel
//!
//! All settings come from environment variables. Defaults live in
//! utils/constants.rs; nothing here hardcodes an endpoint.
//! Security: credentials are NEVER logged.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use super::types::RiskThresholds;
use crate::utils::constants::{
    ledger_explorer_url, ledger_gateway_url, DEFAULT_AUDIT_LOG_PATH,
    DEFAULT_LEDGER_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MODEL_BASE_URL,
    DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_RATE_LIMIT_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS, PLACEHOLDER_API_KEY, SUPPORTED_LEDGER_NETWORKS,
};

// ============================================
// Env helpers
// ============================================

/// Non-empty, trimmed env var
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an env var, falling back to `default` with a warning on garbage
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("⚠️ Invalid value for {} ({:?}), using default {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}

/// True when a credential is absent or still the sample placeholder
pub fn is_placeholder_credential(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == PLACEHOLDER_API_KEY
}

// ============================================
// Server
// ============================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Max in-flight requests at the boundary
    pub max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_concurrent: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        // PORT wins (container platforms set it), then SENTINEL_PORT
        let port = if env_string("PORT").is_some() {
            env_parse("PORT", defaults.port)
        } else {
            env_parse("SENTINEL_PORT", defaults.port)
        };
        Self {
            host: env_string("SENTINEL_HOST").unwrap_or(defaults.host),
            port,
            max_concurrent: env_parse("SENTINEL_MAX_CONCURRENT", defaults.max_concurrent).max(1),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================
// Risk model
// ============================================

#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub thresholds: RiskThresholds,
}

// Manual Debug so the key never ends up in a log line
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let mut thresholds = RiskThresholds::default();
        if let Some(raw) = env_string("MODEL_CRITICAL_THRESHOLD") {
            match raw.parse::<f64>() {
                Ok(v) if (0.0..=1.0).contains(&v) && v >= thresholds.high => {
                    thresholds = thresholds.with_critical(v);
                }
                _ => warn!(
                    "⚠️ Ignoring MODEL_CRITICAL_THRESHOLD={:?} (must be in [{}, 1.0])",
                    raw, thresholds.high
                ),
            }
        }

        let api_key = env_string("MODEL_API_KEY");
        if api_key.as_deref().map(is_placeholder_credential).unwrap_or(true) {
            info!("🧮 MODEL_API_KEY not set, using local heuristic scoring");
        } else {
            info!("🔑 MODEL_API_KEY configured (key hidden for security)");
        }

        Self {
            api_key,
            base_url: env_string("MODEL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            timeout: Duration::from_secs(env_parse("MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT_SECS)),
            thresholds,
        }
    }

    /// A usable (non-placeholder) key is present
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !is_placeholder_credential(k))
            .unwrap_or(false)
    }
}

// ============================================
// Ledger
// ============================================

#[derive(Clone)]
pub struct LedgerConfig {
    pub account_id: Option<String>,
    pub private_key: Option<String>,
    pub topic_id: Option<String>,
    pub network: String,
    pub gateway_url: String,
    pub timeout: Duration,
    pub audit_log_path: PathBuf,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("account_id", &self.account_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("topic_id", &self.topic_id)
            .field("network", &self.network)
            .field("gateway_url", &self.gateway_url)
            .field("timeout", &self.timeout)
            .field("audit_log_path", &self.audit_log_path)
            .finish()
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            private_key: None,
            topic_id: None,
            network: "testnet".to_string(),
            gateway_url: ledger_gateway_url("testnet"),
            timeout: Duration::from_secs(DEFAULT_LEDGER_TIMEOUT_SECS),
            audit_log_path: PathBuf::from(DEFAULT_AUDIT_LOG_PATH),
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        let network = match env_string("LEDGER_NETWORK").map(|n| n.to_lowercase()) {
            Some(n) if SUPPORTED_LEDGER_NETWORKS.contains(&n.as_str()) => n,
            Some(n) => {
                warn!("⚠️ Unsupported LEDGER_NETWORK {:?}, using testnet", n);
                "testnet".to_string()
            }
            None => "testnet".to_string(),
        };

        let config = Self {
            account_id: env_string("LEDGER_ACCOUNT_ID"),
            private_key: env_string("LEDGER_PRIVATE_KEY"),
            topic_id: env_string("LEDGER_TOPIC_ID"),
            gateway_url: env_string("LEDGER_GATEWAY_URL")
                .unwrap_or_else(|| ledger_gateway_url(&network)),
            network,
            timeout: Duration::from_secs(env_parse(
                "LEDGER_TIMEOUT_SECS",
                DEFAULT_LEDGER_TIMEOUT_SECS,
            )),
            audit_log_path: env_string("AUDIT_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG_PATH)),
        };

        if config.is_configured() {
            info!(
                "📜 Ledger configured: network={} topic={}",
                config.network,
                config.topic_id.as_deref().unwrap_or_default()
            );
        } else {
            warn!("📜 Ledger credentials missing, audit records stay in the local log only");
        }
        config
    }

    /// Account, credential and topic are all present
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| {
            v.as_deref().map(|s| !is_placeholder_credential(s)).unwrap_or(false)
        };
        present(&self.account_id) && present(&self.private_key) && present(&self.topic_id)
    }

    /// Explorer page for the configured topic
    pub fn explorer_url(&self) -> Option<String> {
        self.topic_id
            .as_deref()
            .map(|topic| ledger_explorer_url(&self.network, topic))
    }
}

// ============================================
// Rate limiting
// ============================================

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed per window per caller
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            max_requests: env_parse("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS).max(1),
            window: Duration::from_secs(
                env_parse("RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS).max(1),
            ),
        }
    }
}

// ============================================
// Aggregate
// ============================================

/// Everything the binaries need to wire the pipeline
#[derive(Debug, Clone, Default)]
pub struct SentinelConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub ledger: LedgerConfig,
    pub rate_limit: RateLimitConfig,
}

impl SentinelConfig {
    /// Load from the process environment. Never fails; missing or invalid
    /// values degrade to defaults.
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            model: ModelConfig::from_env(),
            ledger: LedgerConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_credentials() {
        assert!(is_placeholder_credential(""));
        assert!(is_placeholder_credential("  "));
        assert!(is_placeholder_credential(PLACEHOLDER_API_KEY));
        assert!(!is_placeholder_credential("sk-live-123"));
    }

    #[test]
    fn test_model_credentials() {
        let mut config = ModelConfig::default();
        assert!(!config.has_credentials());
        config.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert!(!config.has_credentials());
        config.api_key = Some("real-key".to_string());
        assert!(config.has_credentials());
        assert!(!format!("{:?}", config).contains("real-key"));
    }

    #[test]
    fn test_ledger_is_configured() {
        let mut config = LedgerConfig::default();
        assert!(!config.is_configured());
        config.account_id = Some("0.0.1001".into());
        config.private_key = Some("302e0201".into());
        assert!(!config.is_configured());
        config.topic_id = Some("0.0.4242".into());
        assert!(config.is_configured());
        assert_eq!(
            config.explorer_url().as_deref(),
            Some("https://hashscan.io/testnet/topic/0.0.4242")
        );
        assert!(!format!("{:?}", config).contains("302e0201"));
    }

    #[test]
    fn test_defaults() {
        let config = SentinelConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.model.timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(
            config.ledger.audit_log_path,
            PathBuf::from(DEFAULT_AUDIT_LOG_PATH)
        );
    }
}
