use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Keyword tables driving the main/addon decision.
///
/// The decision *order* is fixed in [`crate::classify`]; these lists are
/// data so classification can be tuned without touching the logic. The
/// `version` field tracks revisions of the built-in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub version: u32,
    /// Billing-unit substrings that mark a base subscription (host- or
    /// session-based billing).
    pub main_unit_markers: Vec<String>,
    /// Curated core product names classified as main regardless of unit.
    pub main_product_keywords: Vec<String>,
}

impl ClassifierRules {
    /// Load a rule table from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            version: 1,
            main_unit_markers: [
                "per host",
                "per apm host",
                "per session",
                "per 1k sessions",
            ]
            .map(String::from)
            .to_vec(),
            main_product_keywords: [
                "log management",
                "rum",
                "browser rum",
                "mobile rum",
                "siem",
                "cloud siem",
                "cspm",
                "ciem",
                "synthetic",
                "synthetics",
                "incident management",
                "on-call",
                "ci visibility",
                "test visibility",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}
