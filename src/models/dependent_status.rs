//! Dependent status model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Whether a service member has dependents.
///
/// Affects both the BAH rate and the bedroom standard used for rent lookups.
/// Serialized with the reference-file codes `W` and `WO`.
///
/// # Example
///
/// ```
/// use livability_engine::models::DependentStatus;
///
/// let status: DependentStatus = "wo".parse().unwrap();
/// assert_eq!(status, DependentStatus::WithoutDependents);
/// assert_eq!(status.code(), "WO");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DependentStatus {
    /// Member has dependents (`W`).
    WithDependents,
    /// Member has no dependents (`WO`).
    WithoutDependents,
}

impl DependentStatus {
    /// Returns the reference-file code (`W` or `WO`).
    pub fn code(self) -> &'static str {
        match self {
            DependentStatus::WithDependents => "W",
            DependentStatus::WithoutDependents => "WO",
        }
    }
}

impl fmt::Display for DependentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DependentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "with" | "with_dependents" => Ok(DependentStatus::WithDependents),
            "wo" | "without" | "without_dependents" => Ok(DependentStatus::WithoutDependents),
            _ => Err(EngineError::UnknownDependentStatus {
                code: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DependentStatus {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DependentStatus> for &'static str {
    fn from(status: DependentStatus) -> Self {
        status.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_codes() {
        assert_eq!(
            "W".parse::<DependentStatus>().unwrap(),
            DependentStatus::WithDependents
        );
        assert_eq!(
            "WO".parse::<DependentStatus>().unwrap(),
            DependentStatus::WithoutDependents
        );
    }

    #[test]
    fn test_parse_long_forms() {
        assert_eq!(
            " With ".parse::<DependentStatus>().unwrap(),
            DependentStatus::WithDependents
        );
        assert_eq!(
            "without_dependents".parse::<DependentStatus>().unwrap(),
            DependentStatus::WithoutDependents
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        match "WX".parse::<DependentStatus>() {
            Err(EngineError::UnknownDependentStatus { code }) => assert_eq!(code, "WX"),
            other => panic!("Expected UnknownDependentStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_serialization_uses_reference_codes() {
        assert_eq!(
            serde_json::to_string(&DependentStatus::WithDependents).unwrap(),
            "\"W\""
        );
        let status: DependentStatus = serde_json::from_str("\"WO\"").unwrap();
        assert_eq!(status, DependentStatus::WithoutDependents);
    }
}
