//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>, max_concurrent: usize) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/tools", get(handlers::list_tools))
        .route("/invoke", post(handlers::invoke_tool))
        .route("/stats", get(handlers::get_stats))
        .route("/audit/:correlation_id", get(handlers::verify_audit));

    let rate_limiter = state.rate_limiter.clone();

    Router::new()
        .nest("/v1", api_v1)
        // Unversioned aliases
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))
        .route("/tools", get(handlers::list_tools))
        .route("/invoke", post(handlers::invoke_tool))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RateLimiter;
    use crate::core::{LocalHeuristicModel, RiskScorer};
    use crate::models::RateLimitConfig;
    use crate::providers::AuditLedger;
    use crate::utils::telemetry::TelemetryCollector;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path, max_requests: u32) -> Arc<AppState> {
        let ledger = Arc::new(AuditLedger::local_only(dir.join("audit.jsonl")));
        let scorer = Arc::new(RiskScorer::new(
            Arc::new(LocalHeuristicModel::with_fixed_hour(12)),
            ledger.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        }));
        Arc::new(AppState::new(
            scorer,
            ledger,
            Arc::new(TelemetryCollector::new()),
            limiter,
        ))
    }

    fn invoke(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/invoke")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_routes() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 10), 8);
        for uri in ["/", "/health", "/v1/health"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            let body = json_body(response).await;
            assert_eq!(body["data"]["status"], "healthy");
            assert_eq!(body["data"]["ledger_mode"], "LOCAL_ONLY");
            assert_eq!(body["data"]["denylist_version"], crate::utils::constants::DENYLIST_VERSION);
        }
    }

    #[tokio::test]
    async fn test_list_tools() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 10), 8);
        let response = app
            .oneshot(Request::builder().uri("/v1/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert!(names.contains(&"analyze_transaction_risk"));
        assert_eq!(names.len(), 4);
    }

    #[tokio::test]
    async fn test_invoke_denylisted_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 10), 8);
        let response = app
            .oneshot(invoke(json!({
                "tool": "analyze_transaction_risk",
                "arguments": {
                    "chain": "ethereum",
                    "to_address": "0x000000000000000000000000000000000000dEaD",
                    "value": 1000
                }
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["result"]["risk_level"], "CRITICAL");
        assert_eq!(body["data"]["result"]["risk_score"], 1.0);
        let reference = body["data"]["audit_reference"].as_str().unwrap();
        assert_eq!(reference.len(), 64);
        assert_eq!(body["data"]["ledger"]["mode"], "LOCAL_ONLY");
    }

    #[tokio::test]
    async fn test_invoke_status_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 50), 8);

        let cases = [
            (json!({"arguments": {}}), StatusCode::BAD_REQUEST),
            (json!({"tool": "nope", "arguments": {}}), StatusCode::NOT_FOUND),
            (
                json!({"tool": "analyze_transaction_risk", "arguments": {"chain": "ethereum"}}),
                StatusCode::BAD_REQUEST,
            ),
            (
                json!({"tool": "get_safe_alternatives", "arguments": {"original_action": "swap", "risk_level": "HIGH"}}),
                StatusCode::OK,
            ),
        ];
        for (body, expected) in cases {
            let response = app.clone().oneshot(invoke(body.clone())).await.unwrap();
            assert_eq!(response.status(), expected, "{}", body);
        }

        // Not JSON at all
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 2), 8);
        let request = || {
            Request::builder()
                .uri("/tools")
                .header("x-api-key", "pk_test")
                .body(Body::empty())
                .unwrap()
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "API_RATE_LIMITED");

        // Health stays reachable
        let response = app
            .oneshot(Request::builder().uri("/health").header("x-api-key", "pk_test").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_audit_lookup_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), 50), 8);

        let response = app
            .clone()
            .oneshot(invoke(json!({
                "tool": "analyze_transaction_risk",
                "arguments": {"chain": "hedera", "to_address": "0.0.12345", "value": 10}
            })))
            .await
            .unwrap();
        let body = json_body(response).await;
        let reference = body["data"]["audit_reference"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/audit/{}", reference))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["intact"], true);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/v1/audit/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::builder().uri("/v1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["total_scored"], 1);
        assert_eq!(body["data"]["model_fallbacks"], 1);
    }
}
