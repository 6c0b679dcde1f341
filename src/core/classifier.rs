//! Address Classifier
//!
//! Fast-path check against a static denylist. No I/O, no failure mode.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::normalize_address;
use crate::utils::constants::{DENYLIST_VERSION, KNOWN_SCAM_ADDRESSES};

lazy_static! {
    /// Denylist as a set of normalized addresses
    static ref DENYLIST: HashSet<&'static str> = KNOWN_SCAM_ADDRESSES.iter().copied().collect();
}

/// Result of a denylist lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressClassification {
    pub is_known_scam: bool,
}

/// Reputation bucket exposed by `check_address_reputation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reputation {
    Scam,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressReputation {
    pub address: String,
    pub reputation: Reputation,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractVerification {
    pub contract_address: String,
    pub verified: bool,
    pub risk: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Static denylist classifier. Cheap to clone; all state is in a shared static.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressClassifier;

impl AddressClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Denylist version the classifier was built with
    pub fn version(&self) -> &'static str {
        DENYLIST_VERSION
    }

    /// Case-insensitive, whitespace-trimmed exact match
    #[inline]
    pub fn classify(&self, address: &str) -> AddressClassification {
        AddressClassification {
            is_known_scam: DENYLIST.contains(normalize_address(address).as_str()),
        }
    }

    pub fn reputation(&self, address: &str) -> AddressReputation {
        let normalized = normalize_address(address);
        let (reputation, risk) = if self.classify(&normalized).is_known_scam {
            (Reputation::Scam, 1.0)
        } else {
            (Reputation::Unknown, 0.5)
        };
        AddressReputation {
            address: normalized,
            reputation,
            risk,
        }
    }

    /// Source verification stub: denylisted contracts are reported unverified
    pub fn verify_contract(&self, contract_address: &str) -> ContractVerification {
        let normalized = normalize_address(contract_address);
        if self.classify(&normalized).is_known_scam {
            ContractVerification {
                contract_address: normalized,
                verified: false,
                risk: 1.0,
                reason: Some("Known scam contract".to_string()),
            }
        } else {
            ContractVerification {
                contract_address: normalized,
                verified: true,
                risk: 0.1,
                reason: None,
            }
        }
    }
}
