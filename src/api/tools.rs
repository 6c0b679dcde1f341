//! Tool Gateway
//!
//! Maps named tool invocations onto the scorer and the classifier-backed
//! helper tools. Argument problems surface as validation errors; everything
//! past validation always produces a result.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::ToolDescriptor;
use crate::core::RiskScorer;
use crate::models::{AppError, AppResult, LedgerReceipt, RiskLevel, TransactionDescriptor};
use crate::utils::constants::SAFE_PROTOCOLS;
use crate::utils::telemetry::TelemetryCollector;

/// Tools exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    AnalyzeTransactionRisk,
    CheckAddressReputation,
    VerifyContract,
    GetSafeAlternatives,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::AnalyzeTransactionRisk,
        Tool::CheckAddressReputation,
        Tool::VerifyContract,
        Tool::GetSafeAlternatives,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::AnalyzeTransactionRisk => "analyze_transaction_risk",
            Tool::CheckAddressReputation => "check_address_reputation",
            Tool::VerifyContract => "verify_contract",
            Tool::GetSafeAlternatives => "get_safe_alternatives",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name.trim())
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            Tool::AnalyzeTransactionRisk => ToolDescriptor {
                name: self.name(),
                description: "Analyzes a blockchain transaction for scam risk and records the verdict to the audit ledger.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "chain": {"type": "string", "description": "The blockchain name (e.g. 'hedera', 'ethereum')."},
                        "to_address": {"type": "string", "description": "The recipient's address."},
                        "from_address": {"type": "string", "description": "The sender's address. Optional."},
                        "value": {"type": "number", "description": "The transaction amount in native currency."},
                        "data": {"type": "string", "description": "The transaction data payload. Optional."}
                    },
                    "required": ["chain", "to_address", "value"]
                }),
            },
            Tool::CheckAddressReputation => ToolDescriptor {
                name: self.name(),
                description: "Checks an address against the known-scam denylist.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "address": {"type": "string", "description": "The address to check."}
                    },
                    "required": ["address"]
                }),
            },
            Tool::VerifyContract => ToolDescriptor {
                name: self.name(),
                description: "Reports whether a contract is known to be malicious.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "contract_address": {"type": "string", "description": "The contract address."}
                    },
                    "required": ["contract_address"]
                }),
            },
            Tool::GetSafeAlternatives => ToolDescriptor {
                name: self.name(),
                description: "Suggests trusted protocols when an action is risky.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "original_action": {"type": "string", "description": "What the user tried to do."},
                        "risk_level": {"type": "string", "description": "Risk level of the original action (LOW, MEDIUM, HIGH, CRITICAL)."}
                    },
                    "required": ["original_action", "risk_level"]
                }),
            },
        }
    }
}

/// Result of one tool call
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub result: Value,
    /// Present for tools that write an audit entry
    pub receipt: Option<LedgerReceipt>,
}

/// Dispatches tool invocations
pub struct ToolGateway {
    scorer: Arc<RiskScorer>,
    stats: Arc<TelemetryCollector>,
}

impl ToolGateway {
    pub fn new(scorer: Arc<RiskScorer>, stats: Arc<TelemetryCollector>) -> Self {
        Self { scorer, stats }
    }

    pub fn descriptors() -> Vec<ToolDescriptor> {
        Tool::ALL.iter().map(Tool::descriptor).collect()
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Run `tool_name`. Unknown tools are `ApiNotFound`, bad arguments are validation errors.
    pub async fn invoke(&self, tool_name: &str, arguments: &Value) -> AppResult<ToolOutput> {
        let tool = Tool::parse(tool_name)
            .ok_or_else(|| AppError::not_found(format!("Tool '{}' not found", tool_name)))?;
        let args = as_object(arguments)?;

        match tool {
            Tool::AnalyzeTransactionRisk => {
                let tx = parse_transaction(args)?;
                let start = Instant::now();
                let scored = self.scorer.score(&tx).await;
                self.stats.record(&scored, start.elapsed().as_millis() as u64);
                Ok(ToolOutput {
                    result: to_result(&scored.verdict)?,
                    receipt: Some(scored.receipt),
                })
            }
            Tool::CheckAddressReputation => {
                let address = required_str(args, "address")?;
                let rep = self.scorer.classifier().reputation(address);
                Ok(ToolOutput {
                    result: to_result(rep)?,
                    receipt: None,
                })
            }
            Tool::VerifyContract => {
                let address = required_str(args, "contract_address")?;
                let verification = self.scorer.classifier().verify_contract(address);
                Ok(ToolOutput {
                    result: to_result(verification)?,
                    receipt: None,
                })
            }
            Tool::GetSafeAlternatives => {
                let action = required_str(args, "original_action")?;
                let level = required_str(args, "risk_level")?;
                let level = RiskLevel::parse(level).ok_or_else(|| {
                    AppError::invalid_value("risk_level", format!("unknown level {:?}", level))
                })?;
                info!("🧭 Alternatives requested for '{}' at {}", action, level.as_str());
                Ok(ToolOutput {
                    result: safe_alternatives(level),
                    receipt: None,
                })
            }
        }
    }
}

/// Trusted protocol list for dangerous levels, nothing otherwise
pub fn safe_alternatives(level: RiskLevel) -> Value {
    if level.is_dangerous() {
        json!({
            "alternatives": SAFE_PROTOCOLS,
            "message": "Use trusted protocols only."
        })
    } else {
        json!({
            "alternatives": [],
            "message": "No alternatives needed."
        })
    }
}

fn to_result<T: serde::Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("Result serialization failed: {}", e)))
}

// ============================================
// Argument parsing
// ============================================

fn as_object(arguments: &Value) -> AppResult<&Map<String, Value>> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(EMPTY.get_or_init(Map::new)),
        _ => Err(AppError::invalid_value("arguments", "must be a JSON object")),
    }
}

fn required_str<'a>(args: &'a Map<String, Value>, field: &str) -> AppResult<&'a str> {
    match args.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(AppError::missing_field(field)),
        Some(_) => Err(AppError::invalid_value(field, "must be a string")),
    }
}

fn optional_str(args: &Map<String, Value>, field: &str) -> AppResult<Option<String>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AppError::invalid_value(field, "must be a string")),
    }
}

/// Numbers, or numeric strings as some wallets send them
fn required_number(args: &Map<String, Value>, field: &str) -> AppResult<f64> {
    match args.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::invalid_value(field, "not a finite number")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::invalid_value(field, format!("{:?} is not a number", s))),
        None | Some(Value::Null) => Err(AppError::missing_field(field)),
        Some(_) => Err(AppError::invalid_value(field, "must be a number")),
    }
}

/// Build and validate a descriptor from tool arguments
pub fn parse_transaction(args: &Map<String, Value>) -> AppResult<TransactionDescriptor> {
    let tx = TransactionDescriptor {
        chain: required_str(args, "chain")?.trim().to_string(),
        to_address: required_str(args, "to_address")?.trim().to_string(),
        from_address: optional_str(args, "from_address")?,
        value: required_number(args, "value")?,
        data: optional_str(args, "data")?,
    };
    tx.validate()?;
    Ok(tx)
}
