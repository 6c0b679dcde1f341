//! TxSentinel Tool Gateway Server
//!
//! Usage:
//!   cargo run --bin sentinel_api
//!
//! Environment:
//!   PORT / SENTINEL_PORT - Server port (default: 8080)
//!   SENTINEL_HOST        - Server host (default: 0.0.0.0)
//!   MODEL_API_KEY        - Remote risk model key (local heuristic when unset)
//!   LEDGER_*             - Topic ledger credentials (local audit log only when unset)
//!   RUST_LOG             - Log filter (default: info)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tx_sentinel::api::{create_router, start_cleanup_task, AppState};
use tx_sentinel::models::{RiskLevel, SentinelConfig};
use tx_sentinel::utils::constants::{APP_NAME, APP_VERSION};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = SentinelConfig::from_env();
    let state = Arc::new(AppState::from_config(&config));
    let telemetry = state.telemetry.clone();

    // Evict idle callers from the rate limiter
    start_cleanup_task(state.rate_limiter.clone(), config.rate_limit.window);
    info!("🧹 Background cleanup task started");

    let app = create_router(state, config.server.max_concurrent);

    let addr: SocketAddr = config.server.bind_addr().parse()?;
    info!("🚀 {} v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /health, /v1/health          - Health check");
    info!("  GET  /tools, /v1/tools            - Tool descriptors");
    info!("  POST /invoke, /v1/invoke          - Invoke a tool");
    info!("  GET  /v1/stats                    - Scoring statistics");
    info!("  GET  /v1/audit/:correlation_id    - Verify an audit receipt");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("🛑 Shutdown signal received, cleaning up...");
    let stats = telemetry.get_stats();
    info!("📊 Final statistics:");
    info!("   Total scored:      {}", stats.total_scored);
    for level in RiskLevel::ALL {
        let count = stats.level_count(level);
        if count > 0 {
            info!("   {} {:<9} {}", level.emoji(), level.as_str(), count);
        }
    }
    info!("   Model fallbacks:   {}", stats.model_fallbacks);
    info!("   Ledger local-only: {}", stats.ledger_local_only);
    info!("   Avg latency:       {:.2}ms", stats.avg_latency_ms);

    match telemetry.export_stats_json(Path::new("./telemetry")) {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    // Give in-flight log lines a moment to flush
    tokio::time::sleep(Duration::from_millis(50)).await;
    info!("👋 {} shutdown complete", APP_NAME);

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════╗
    ║                                                      ║
    ║              T X   S E N T I N E L                   ║
    ║                                                      ║
    ║      Transaction risk scoring + audit receipts       ║
    ║                                                      ║
    ╚══════════════════════════════════════════════════════╝
    "#
    );
}
