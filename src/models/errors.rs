//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so degraded paths can be told
//! apart in the logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VAL_xxx: request validation (surfaced to the caller as 4xx)
//! - UPSTREAM_xxx: risk model / ledger backends (absorbed by fallbacks)
//! - SCORING_xxx: unexpected failures inside the scoring pipeline
//! - API_xxx: tool gateway errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Which branch of the error taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Top-level error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request fields. Never reaches the scorer.
    Validation,
    /// A remote collaborator failed. Always recovered by a local fallback.
    UpstreamUnavailable,
    /// Unexpected failure inside the scorer. Surfaces as `RiskLevel::Error`.
    InternalScoring,
    /// Gateway / configuration problems
    Boundary,
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors
    // ============================================
    /// A required field is missing or empty
    ValidationMissingField,
    /// A field has the wrong type or an out-of-range value
    ValidationInvalidValue,

    // ============================================
    // Upstream Errors
    // ============================================
    /// Remote model or ledger could not be reached
    UpstreamConnectionFailed,
    /// Remote call exceeded its timeout
    UpstreamTimeout,
    /// Remote call returned a non-2xx status
    UpstreamBadStatus,
    /// Backend refused the request (4xx other than 408/429); retrying will not help
    UpstreamRejected,
    /// Remote call returned a body we could not understand
    UpstreamInvalidResponse,
    /// Remote credentials absent or still set to a placeholder
    UpstreamNotConfigured,

    // ============================================
    // Scoring Errors
    // ============================================
    /// Unexpected failure inside the scoring pipeline
    ScoringInternal,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Unknown tool or resource
    ApiNotFound,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration / IO Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Local audit log could not be written or read
    AuditLogIo,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationMissingField => "VAL_MISSING_FIELD",
            Self::ValidationInvalidValue => "VAL_INVALID_VALUE",

            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamBadStatus => "UPSTREAM_BAD_STATUS",
            Self::UpstreamRejected => "UPSTREAM_REJECTED",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",
            Self::UpstreamNotConfigured => "UPSTREAM_NOT_CONFIGURED",

            Self::ScoringInternal => "SCORING_INTERNAL",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::AuditLogIo => "AUDIT_LOG_IO",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Taxonomy branch for this code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationMissingField | Self::ValidationInvalidValue => ErrorKind::Validation,
            Self::UpstreamConnectionFailed
            | Self::UpstreamTimeout
            | Self::UpstreamBadStatus
            | Self::UpstreamRejected
            | Self::UpstreamInvalidResponse
            | Self::UpstreamNotConfigured => ErrorKind::UpstreamUnavailable,
            Self::ScoringInternal => ErrorKind::InternalScoring,
            _ => ErrorKind::Boundary,
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationMissingField
            | Self::ValidationInvalidValue
            | Self::ApiBadRequest
            | Self::ConfigInvalidValue => 400,
            Self::ApiNotFound => 404,
            Self::ApiRateLimited => 429,
            Self::UpstreamConnectionFailed
            | Self::UpstreamBadStatus
            | Self::UpstreamRejected
            | Self::UpstreamInvalidResponse
            | Self::UpstreamNotConfigured => 502,
            Self::UpstreamTimeout => 504,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamConnectionFailed | Self::UpstreamTimeout | Self::UpstreamBadStatus
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Required field missing
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::ValidationMissingField,
            format!("Missing required field: {}", field),
        )
    }

    /// Field present but invalid
    pub fn invalid_value(field: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidValue,
            format!("Invalid value for '{}': {}", field, reason),
        )
    }

    /// Unexpected scorer failure
    pub fn internal_scoring(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ScoringInternal, msg)
    }

    /// Remote backend not configured
    pub fn not_configured(what: &str) -> Self {
        Self::new(
            ErrorCode::UpstreamNotConfigured,
            format!("{} credentials not configured", what),
        )
    }

    /// Remote backend answered with a non-2xx status
    pub fn bad_status(status: u16) -> Self {
        let code = match status {
            408 | 429 => ErrorCode::UpstreamBadStatus,
            400..=499 => ErrorCode::UpstreamRejected,
            _ => ErrorCode::UpstreamBadStatus,
        };
        Self::new(code, format!("HTTP error: {}", status))
    }

    /// Worth another attempt
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Remote backend answered with an unusable body
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamInvalidResponse, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API not found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiNotFound, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::AuditLogIo, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::UpstreamTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else if let Some(status) = err.status() {
            Self::bad_status(status.as_u16())
        } else if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::new(ErrorCode::UpstreamConnectionFailed, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}
