//! Bedroom standard resolution.
//!
//! The BAH Primer fixes how many bedrooms a member is housed in for each
//! grade and dependent status. The rent lookup uses this count as a direct
//! index into the fair market rent tables.

use crate::models::{AuditStep, BedroomStandard, DependentStatus, Grade};

/// Reference for the bedroom standard tables.
pub const BEDROOM_STANDARD_REFERENCE: &str = "BAH Primer housing standards";

/// Returns the bedroom standard for a grade and dependent status.
///
/// Both enums are closed, so every pair is covered; unknown grade or status
/// strings are rejected when they are parsed.
///
/// # Examples
///
/// ```
/// use livability_engine::calculation::bedroom_standard;
/// use livability_engine::models::{BedroomStandard, DependentStatus, Grade};
///
/// assert_eq!(
///     bedroom_standard(Grade::O4, DependentStatus::WithDependents),
///     BedroomStandard::Three
/// );
/// assert_eq!(
///     bedroom_standard(Grade::E1, DependentStatus::WithoutDependents),
///     BedroomStandard::One
/// );
/// ```
pub fn bedroom_standard(grade: Grade, status: DependentStatus) -> BedroomStandard {
    use BedroomStandard::{Four, One, Three, Two};
    use Grade::*;

    match status {
        DependentStatus::WithDependents => match grade {
            E1 | E2 | E3 | E4 | E5 => Two,
            E6 | E7 | E8 | E9 => Three,
            W1 | W2 | W3 | W4 | W5 => Three,
            O1E | O2E | O3E => Three,
            O1 | O2 => Two,
            O3 | O4 => Three,
            O5 | O6 | O7 | O8 | O9 | O10 => Four,
        },
        DependentStatus::WithoutDependents => match grade {
            E1 | E2 | E3 | E4 | E5 => One,
            E6 | E7 | E8 | E9 => Two,
            W1 | W2 | W3 => Two,
            W4 | W5 => Three,
            O1E | O2E => Two,
            O3E => Three,
            O1 | O2 | O3 => Two,
            O4 | O5 | O6 | O7 | O8 | O9 | O10 => Three,
        },
    }
}

/// The result of a bedroom standard resolution, including the audit step.
#[derive(Debug, Clone)]
pub struct BedroomStandardResult {
    /// The resolved bedroom standard.
    pub standard: BedroomStandard,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the bedroom standard and records an audit step.
pub fn resolve_bedroom_standard(
    grade: Grade,
    status: DependentStatus,
    step_number: u32,
) -> BedroomStandardResult {
    let standard = bedroom_standard(grade, status);

    let audit_step = AuditStep {
        step_number,
        rule_id: "bedroom_standard".to_string(),
        rule_name: "Bedroom Standard".to_string(),
        reference: BEDROOM_STANDARD_REFERENCE.to_string(),
        input: serde_json::json!({
            "grade": grade.code(),
            "dependent_status": status.code()
        }),
        output: serde_json::json!({
            "bedrooms": standard.count()
        }),
        reasoning: format!(
            "{} ({}) is housed in {} bedroom(s)",
            grade,
            status,
            standard.count()
        ),
    };

    BedroomStandardResult {
        standard,
        audit_step,
    }
}
