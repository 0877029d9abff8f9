//! Request types for the livability engine API.
//!
//! Codes arrive as plain strings so that an unknown grade or a malformed ZIP
//! is reported with its own error code rather than as a generic JSON error.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{DependentStatus, Grade, LivabilityWeights, NeighborhoodMetrics, ZipCode};

/// Member details shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    /// The duty location ZIP.
    pub duty_zip: ZipCode,
    /// The member's dependent status.
    pub dependent_status: DependentStatus,
    /// The member's pay grade.
    pub grade: Grade,
}

fn parse_member(duty_zip: &str, dependent_status: &str, grade: &str) -> EngineResult<MemberProfile> {
    Ok(MemberProfile {
        duty_zip: ZipCode::new(duty_zip)?,
        dependent_status: dependent_status.parse()?,
        grade: grade.parse()?,
    })
}

/// Request body for `POST /affordability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityRequest {
    /// The duty location ZIP (e.g. "20001").
    pub duty_zip: String,
    /// The ZIP to rate.
    pub candidate_zip: String,
    /// "W" or "WO".
    pub dependent_status: String,
    /// Pay grade code (e.g. "O04").
    pub grade: String,
}

impl AffordabilityRequest {
    /// Validates the request into domain types.
    pub fn parse(&self) -> EngineResult<(MemberProfile, ZipCode)> {
        let member = parse_member(&self.duty_zip, &self.dependent_status, &self.grade)?;
        let candidate = ZipCode::new(&self.candidate_zip)?;
        Ok((member, candidate))
    }
}

/// Request body for `POST /affordability/candidates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesRequest {
    /// The duty location ZIP.
    pub duty_zip: String,
    /// The ZIPs to rate, in the order results should be returned.
    pub candidate_zips: Vec<String>,
    /// "W" or "WO".
    pub dependent_status: String,
    /// Pay grade code.
    pub grade: String,
}

impl CandidatesRequest {
    /// Validates the request into domain types.
    pub fn parse(&self) -> EngineResult<(MemberProfile, Vec<ZipCode>)> {
        let member = parse_member(&self.duty_zip, &self.dependent_status, &self.grade)?;
        let candidates = self
            .candidate_zips
            .iter()
            .map(|zip| ZipCode::new(zip))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok((member, candidates))
    }
}

/// Request body for `POST /livability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivabilityRequest {
    /// The duty location ZIP.
    pub duty_zip: String,
    /// "W" or "WO".
    pub dependent_status: String,
    /// Pay grade code.
    pub grade: String,
    /// Metric weights; omitted weights take their defaults.
    #[serde(default)]
    pub weights: LivabilityWeights,
    /// How many ranked neighborhoods to return; all when omitted.
    #[serde(default)]
    pub limit: Option<usize>,
    /// The neighborhoods to score.
    pub neighborhoods: Vec<NeighborhoodMetrics>,
}

impl LivabilityRequest {
    /// Validates the member fields and weights.
    pub fn parse(&self) -> EngineResult<MemberProfile> {
        self.weights.validate()?;
        parse_member(&self.duty_zip, &self.dependent_status, &self.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn affordability(grade: &str, status: &str) -> AffordabilityRequest {
        AffordabilityRequest {
            duty_zip: "20001".to_string(),
            candidate_zip: "2134".to_string(),
            dependent_status: status.to_string(),
            grade: grade.to_string(),
        }
    }

    #[test]
    fn test_parse_normalises_codes() {
        let (member, candidate) = affordability("o-4", "with").parse().unwrap();
        assert_eq!(member.grade, Grade::O4);
        assert_eq!(member.dependent_status, DependentStatus::WithDependents);
        assert_eq!(candidate.as_str(), "02134");
    }

    #[test]
    fn test_unknown_grade_is_rejected() {
        let result = affordability("Z9", "W").parse();
        assert!(matches!(result, Err(EngineError::UnknownGrade { .. })));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = affordability("O04", "MAYBE").parse();
        assert!(matches!(
            result,
            Err(EngineError::UnknownDependentStatus { .. })
        ));
    }

    #[test]
    fn test_invalid_candidate_zip_is_rejected() {
        let request = CandidatesRequest {
            duty_zip: "20001".to_string(),
            candidate_zips: vec!["22201".to_string(), "not-a-zip".to_string()],
            dependent_status: "W".to_string(),
            grade: "O04".to_string(),
        };
        assert!(matches!(
            request.parse(),
            Err(EngineError::InvalidZipCode { .. })
        ));
    }

    #[test]
    fn test_livability_request_defaults() {
        let json = r#"{
            "duty_zip": "20001",
            "dependent_status": "W",
            "grade": "E5",
            "neighborhoods": []
        }"#;
        let request: LivabilityRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.weights, LivabilityWeights::default());
        assert_eq!(request.limit, None);
        assert_eq!(request.parse().unwrap().grade, Grade::E5);
    }
}
