//! API Request/Response Types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AppError, ErrorCode, LedgerReceipt};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ApiBadRequest.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: ErrorCode::ApiRateLimited.as_str().to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(serde_json::json!({ "retry_after": retry_after })),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

// ============================================
// Tool invocation
// ============================================

/// `POST /invoke` body. `tool` is optional here so a missing name maps to 400.
#[derive(Debug, Deserialize)]
pub struct ToolInvocation {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub arguments: Value,
}

/// Successful tool call
#[derive(Debug, Serialize)]
pub struct InvokeData {
    pub tool: String,
    pub request_id: String,
    pub result: Value,
    /// Correlation id of the audit entry (analysis tools only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<LedgerReceipt>,
}

/// Entry of `GET /tools`
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of `arguments`
    pub parameters: Value,
}

// ============================================
// Health & Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub risk_model: String,
    pub ledger_mode: String,
    pub denylist_version: String,
}

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub uptime_seconds: u64,
    #[serde(flatten)]
    pub stats: crate::utils::telemetry::TelemetryStats,
}
