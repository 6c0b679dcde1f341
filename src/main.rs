//! TxSentinel - one-shot transaction risk check
//!
//! Usage:
//!   tx_sentinel '{"chain":"ethereum","to_address":"0x...","value":1.5}'
//!   tx_sentinel ./tx.json
//!   cat tx.json | tx_sentinel
//!
//! Prints the verdict and the audit receipt as JSON on stdout. Logs go to stderr.

use eyre::{Result, WrapErr};
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tx_sentinel::{build_risk_model, AuditLedger, RiskScorer, SentinelConfig, TransactionDescriptor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let raw = read_input(std::env::args().nth(1))?;
    let tx: TransactionDescriptor =
        serde_json::from_str(&raw).wrap_err("transaction must be a JSON object")?;
    tx.validate()?;

    let config = SentinelConfig::from_env();
    let ledger = Arc::new(AuditLedger::from_config(&config.ledger));
    let model = build_risk_model(&config.model);
    let scorer = RiskScorer::new(model, ledger).with_thresholds(config.model.thresholds);

    info!("🔍 Scoring {} transfer to {}", tx.chain, tx.to_address);
    let scored = scorer.score(&tx).await;

    println!("{}", serde_json::to_string_pretty(&scored)?);
    Ok(())
}

/// Inline JSON, a path to a JSON file, or stdin when no argument is given
fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(arg) if arg.trim_start().starts_with('{') => Ok(arg),
        Some(path) => {
            std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {}", path))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read transaction from stdin")?;
            Ok(buf)
        }
    }
}
