//! Constants Module - Single Source of Truth
//!
//! Denylist, heuristic weights, default endpoints and timeouts used across
//! the pipeline. Other modules import from here instead of hardcoding values.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "TxSentinel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "TxSentinel/0.1.0";

// ============================================
// AUDIT CONSTANTS
// ============================================

/// Version stamped on every audit record
pub const AUDIT_SCHEMA_VERSION: &str = "1.0.0";

/// Correlation marker when no audit reference could be produced
pub const AUDIT_UNAVAILABLE: &str = "unavailable";

/// Default location of the local append-only audit log
pub const DEFAULT_AUDIT_LOG_PATH: &str = "./audit/audit_log.jsonl";

// ============================================
// DENYLIST
// ============================================

/// Bumped whenever `KNOWN_SCAM_ADDRESSES` changes
pub const DENYLIST_VERSION: &str = "2024.1";

/// Addresses classified CRITICAL without consulting the model (lowercase)
pub const KNOWN_SCAM_ADDRESSES: [&str; 2] = [
    "0x000000000000000000000000000000000000dead",
    "0x1234567890abcdef1234567890abcdef12345678",
];

/// Protocols suggested when a transaction looks dangerous
pub const SAFE_PROTOCOLS: [&str; 6] = [
    "uniswap",
    "aave",
    "compound",
    "curve",
    "saucerswap",
    "hashport",
];

// ============================================
// LOCAL HEURISTIC
// ============================================

/// Transaction value at which the value feature saturates
pub const VALUE_CAP: f64 = 10_000.0;

/// Normalization constant for address entropy (bits)
pub const MAX_ENTROPY_BITS: f64 = 4.0;

/// Entropy reported for an empty address
pub const NEUTRAL_ENTROPY: f64 = 0.5;

/// Weight for chains missing from the table
pub const DEFAULT_CHAIN_RISK: f64 = 0.6;

/// Local hours considered unusual: before 06:00 or after 22:59
pub const QUIET_HOURS_START: u32 = 6;
pub const QUIET_HOURS_END: u32 = 22;

/// Feature weights: [value, entropy, chain, contract, time]. Sum to 1.0.
pub const HEURISTIC_WEIGHTS: [f64; 5] = [0.3, 0.2, 0.2, 0.2, 0.1];

/// Static per-chain risk weight
pub fn chain_risk_weight(chain: &str) -> f64 {
    match chain.trim().to_lowercase().as_str() {
        "ethereum" | "eth" => 0.4,
        "hedera" | "hbar" => 0.2,
        "polygon" | "matic" => 0.5,
        "arbitrum" | "optimism" | "base" => 0.4,
        "avalanche" | "avax" => 0.5,
        "bsc" | "binance" | "bnb" => 0.7,
        "solana" | "sol" => 0.6,
        "tron" | "trx" => 0.8,
        _ => DEFAULT_CHAIN_RISK,
    }
}

// ============================================
// REMOTE MODEL
// ============================================

/// Default scoring backend
pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.comput3.ai/v1";

/// Path appended to the model base URL
pub const MODEL_ANALYSIS_PATH: &str = "/analysis/transaction";

/// Default timeout for the remote model (seconds)
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 5;

/// Value shipped in sample env files; treated as "no key"
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

// ============================================
// LEDGER
// ============================================

/// Default timeout for ledger submissions (seconds)
pub const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 5;

/// Submission attempts before degrading to local-only
pub const LEDGER_MAX_ATTEMPTS: u32 = 3;

/// Base retry delay (doubles per attempt)
pub const LEDGER_BASE_RETRY_MS: u64 = 200;

/// Jitter percentage applied to retry delays
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// Default gateway for a ledger network
pub fn ledger_gateway_url(network: &str) -> String {
    format!("https://{}.mirrornode.hedera.com", network)
}

/// Public explorer page for a topic
pub fn ledger_explorer_url(network: &str, topic_id: &str) -> String {
    format!("https://hashscan.io/{}/topic/{}", network, topic_id)
}

/// Networks accepted by the ledger selector
pub const SUPPORTED_LEDGER_NETWORKS: [&str; 3] = ["testnet", "mainnet", "previewnet"];

// ============================================
// SERVER
// ============================================

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default max in-flight requests
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 256;

/// Default rate limit: requests per window
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;

/// Default rate limit window (seconds)
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
