//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::RateLimiter;
use super::tools::ToolGateway;
use super::types::*;
use crate::core::{build_risk_model, RiskScorer};
use crate::models::{AppError, ErrorKind, SentinelConfig};
use crate::providers::ledger::{AuditLedger, AuditVerification};
use crate::utils::constants::{APP_NAME, APP_VERSION};
use crate::utils::telemetry::TelemetryCollector;

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub gateway: ToolGateway,
    pub ledger: Arc<AuditLedger>,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        scorer: Arc<RiskScorer>,
        ledger: Arc<AuditLedger>,
        telemetry: Arc<TelemetryCollector>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            gateway: ToolGateway::new(scorer, telemetry.clone()),
            ledger,
            telemetry,
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    /// Wire model, ledger and scorer from configuration
    pub fn from_config(config: &SentinelConfig) -> Self {
        let ledger = Arc::new(AuditLedger::from_config(&config.ledger));
        let model = build_risk_model(&config.model);
        let scorer = Arc::new(
            RiskScorer::new(model, ledger.clone()).with_thresholds(config.model.thresholds),
        );
        Self::new(
            scorer,
            ledger,
            Arc::new(TelemetryCollector::new()),
            Arc::new(RateLimiter::new(config.rate_limit)),
        )
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map an error onto its status code and the error envelope
fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        service: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        risk_model: state.gateway.scorer().model_name().to_string(),
        ledger_mode: if state.ledger.is_remote_enabled() {
            "REMOTE".to_string()
        } else {
            "LOCAL_ONLY".to_string()
        },
        denylist_version: state.gateway.scorer().classifier().version().to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Tools
// ============================================

pub async fn list_tools() -> Json<ApiResponse<Vec<ToolDescriptor>>> {
    let start = Instant::now();
    Json(ApiResponse::success(ToolGateway::descriptors(), elapsed_ms(start)))
}

pub async fn invoke_tool(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ToolInvocation>, JsonRejection>,
) -> Result<Json<ApiResponse<InvokeData>>, ApiFailure> {
    let start = Instant::now();

    let Json(invocation) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request("Invalid request body").with_details(rejection.body_text().into()),
                elapsed_ms(start),
            )),
        )
    })?;

    let tool = invocation
        .tool
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| failure(&AppError::bad_request("Invalid request, 'tool' is required"), start))?;

    let request_id = uuid::Uuid::new_v4().to_string();
    info!("🛠️ [{}] invoke {}", request_id, tool);

    let output = match state.gateway.invoke(&tool, &invocation.arguments).await {
        Ok(output) => output,
        Err(e) => {
            match e.kind() {
                ErrorKind::Validation | ErrorKind::Boundary if e.code.http_status() < 500 => {
                    warn!("⚠️ [{}] {} rejected: {}", request_id, tool, e)
                }
                _ => error!("❌ [{}] {} failed: {}", request_id, tool, e),
            }
            return Err(failure(&e, start));
        }
    };

    let data = InvokeData {
        tool,
        request_id,
        result: output.result,
        audit_reference: output
            .receipt
            .as_ref()
            .map(|r| r.audit_reference().to_string()),
        ledger: output.receipt,
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let data = StatsData {
        uptime_seconds: state.uptime_seconds(),
        stats: state.telemetry.get_stats(),
    };
    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Audit verification
// ============================================

pub async fn verify_audit(
    State(state): State<Arc<AppState>>,
    Path(correlation_id): Path<String>,
) -> Result<Json<ApiResponse<AuditVerification>>, ApiFailure> {
    let start = Instant::now();

    match state.ledger.verify(&correlation_id).await {
        Ok(Some(verification)) => {
            if !verification.intact {
                warn!("🚨 Audit entry {} failed hash verification", correlation_id);
            }
            Ok(Json(ApiResponse::success(verification, elapsed_ms(start))))
        }
        Ok(None) => Err(failure(
            &AppError::not_found(format!("No audit entry for '{}'", correlation_id)),
            start,
        )),
        Err(e) => {
            error!("❌ Audit lookup failed: {}", e);
            Err(failure(&AppError::internal("Audit log could not be read"), start))
        }
    }
}
