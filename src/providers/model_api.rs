//! Remote Risk Model Client
//!
//! POST {base_url}/analysis/transaction with bearer auth. The backend may
//! return its fields at the top level or nested under `result`:
//!
//! ```json
//! { "risk_score": 0.42, "factors": ["..."], "model": "v3" }
//! { "result": { "risk_score": 0.42 } }
//! ```
//!
//! Everything except `risk_score` and `factors` is forwarded as details.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::models::{AppError, AppResult, ErrorCode, TransactionDescriptor};
use crate::utils::constants::{MODEL_ANALYSIS_PATH, USER_AGENT as USER_AGENT_CONST};

/// Request body sent to the scoring backend
#[derive(Debug, Serialize)]
pub struct AnalysisRequest<'a> {
    pub chain: &'a str,
    pub to: &'a str,
    pub from: Option<&'a str>,
    /// Sent as a decimal string so large values keep their precision
    pub value: String,
    pub data: Option<&'a str>,
}

impl<'a> From<&'a TransactionDescriptor> for AnalysisRequest<'a> {
    fn from(tx: &'a TransactionDescriptor) -> Self {
        Self {
            chain: &tx.chain,
            to: &tx.to_address,
            from: tx.from_address.as_deref(),
            value: tx.value.to_string(),
            data: tx.data.as_deref(),
        }
    }
}

/// Parsed backend answer
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAnalysis {
    pub risk_score: f64,
    pub factors: Vec<String>,
    pub extra: Map<String, Value>,
}

/// HTTP client for the scoring backend
pub struct ModelApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ModelApiClient {
    /// `api_key` is placed in a default header and never logged
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| AppError::new(ErrorCode::ConfigInvalidValue, "MODEL_API_KEY is not a valid header value"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), MODEL_ANALYSIS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single attempt, no retry: the caller falls back to the local heuristic
    pub async fn analyze(&self, tx: &TransactionDescriptor) -> AppResult<RemoteAnalysis> {
        let body = AnalysisRequest::from(tx);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes)?;
        let analysis = parse_analysis(json)?;
        debug!("🤖 Remote model score {:.3} ({} factors)", analysis.risk_score, analysis.factors.len());
        Ok(analysis)
    }
}

/// Extract score/factors from a backend body
pub fn parse_analysis(body: Value) -> AppResult<RemoteAnalysis> {
    let mut obj = match body {
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("result".to_string(), other);
                map
            }
            None => map,
        },
        _ => return Err(AppError::invalid_response("Response body is not a JSON object")),
    };

    let risk_score = match obj.remove("risk_score") {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::invalid_response("risk_score is not representable as f64"))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::invalid_response(format!("risk_score is not numeric: {:?}", s)))?,
        Some(_) => return Err(AppError::invalid_response("risk_score is not numeric")),
        None => return Err(AppError::invalid_response("Missing risk_score")),
    };
    // "NaN" and "inf" parse as f64 but are not scores
    if !risk_score.is_finite() {
        return Err(AppError::invalid_response(format!(
            "risk_score is not finite: {}",
            risk_score
        )));
    }

    let factors = match obj.remove("factors") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    };

    Ok(RemoteAnalysis {
        risk_score,
        factors,
        extra: obj,
    })
}
