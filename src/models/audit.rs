//! Audit trace models.
//!
//! Every lookup records what it was asked, what it answered and which
//! reference table (or fallback) produced the answer, so a score shown on
//! the map can be traced back to its inputs.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a lookup decision.
///
/// # Example
///
/// ```
/// use livability_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "bedroom_standard".to_string(),
///     rule_name: "Bedroom Standard".to_string(),
///     reference: "BAH Primer".to_string(),
///     input: serde_json::json!({ "grade": "O04", "dependent_status": "W" }),
///     output: serde_json::json!({ "bedrooms": 3 }),
///     reasoning: "O04 with dependents is entitled to 3 bedrooms".to_string(),
/// };
/// assert_eq!(step.output["bedrooms"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The published table or rule this step is based on.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during a lookup.
///
/// Warnings flag answers that came from a fallback rather than the primary
/// table; they never stop a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of lookup steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns the number to give the next appended step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}
