//! Affordability result models.
//!
//! This module contains the outputs of the allowance/rent lookup chain and
//! the [`AffordabilityResult`] handed to rendering collaborators.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditTrace, BedroomStandard, CountyFips, DependentStatus, Grade, MhaCode, ZipCode};

/// Which tier of the rent fallback chain produced a fair market rent.
///
/// # Example
///
/// ```
/// use livability_engine::models::RentSource;
///
/// let json = serde_json::to_string(&RentSource::NationalAverage).unwrap();
/// assert_eq!(json, r#"{"tier":"national_average"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum RentSource {
    /// Small Area FMR published for the ZIP itself.
    Zip,
    /// County FMR for the county the ZIP lies in.
    County {
        /// The county the ZIP was resolved to.
        fips: CountyFips,
    },
    /// National average constant for the bedroom count.
    NationalAverage,
}

impl RentSource {
    /// Returns a short label for logs and audit output.
    pub fn label(&self) -> &'static str {
        match self {
            RentSource::Zip => "zip",
            RentSource::County { .. } => "county",
            RentSource::NationalAverage => "national_average",
        }
    }
}

/// Where an allowance rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllowanceSource {
    /// Published BAH rate for the ZIP's Military Housing Area.
    HousingArea {
        /// The housing area the ZIP belongs to.
        mha: MhaCode,
        /// The housing area's display name, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Estimated as a fraction of the fair market rent at the ZIP.
    RentProxy {
        /// The multiplier applied to the rent.
        factor: Decimal,
        /// The tier that produced the underlying rent.
        rent_source: RentSource,
    },
}

/// A discrete affordability rating from 0 (least) to 5 (most affordable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffordabilityRating(u8);

impl AffordabilityRating {
    /// The highest rating.
    pub const MAX: AffordabilityRating = AffordabilityRating(5);

    pub(crate) fn new(value: u8) -> Self {
        Self(value.min(Self::MAX.0))
    }

    /// Returns the rating value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AffordabilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete result of rating a candidate ZIP against a duty location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// The ZIP of the duty location whose allowance is used.
    pub duty_zip: ZipCode,
    /// The ZIP whose rent is compared.
    pub candidate_zip: ZipCode,
    /// The member's pay grade.
    pub grade: Grade,
    /// The member's dependent status.
    pub dependent_status: DependentStatus,
    /// The bedroom standard used for the rent lookup.
    pub bedroom_standard: BedroomStandard,
    /// The monthly housing allowance at the duty ZIP.
    pub allowance: Decimal,
    /// Where the allowance came from.
    pub allowance_source: AllowanceSource,
    /// The monthly fair market rent at the candidate ZIP.
    pub fair_market_rent: Decimal,
    /// Where the rent came from.
    pub rent_source: RentSource,
    /// Allowance divided by rent, unrounded.
    pub ratio: Decimal,
    /// The discrete rating for `ratio`.
    pub rating: AffordabilityRating,
    /// The lookup audit trace.
    pub audit_trace: AuditTrace,
}

/// One row of a candidate score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// The candidate ZIP.
    pub zip: ZipCode,
    /// The fair market rent at the candidate ZIP.
    pub fair_market_rent: Decimal,
    /// Where the rent came from.
    pub rent_source: RentSource,
    /// Allowance divided by rent, unrounded.
    pub ratio: Decimal,
    /// The discrete rating for `ratio`.
    pub rating: AffordabilityRating,
}

/// Affordability of many candidate ZIPs against a single duty allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScores {
    /// The duty location ZIP.
    pub duty_zip: ZipCode,
    /// The member's pay grade.
    pub grade: Grade,
    /// The member's dependent status.
    pub dependent_status: DependentStatus,
    /// The bedroom standard used for every rent lookup.
    pub bedroom_standard: BedroomStandard,
    /// The monthly housing allowance at the duty ZIP.
    pub allowance: Decimal,
    /// Where the allowance came from.
    pub allowance_source: AllowanceSource,
    /// One score per candidate, in input order.
    pub scores: Vec<CandidateScore>,
    /// Audit trace covering the shared allowance and bedroom lookups.
    pub audit_trace: AuditTrace,
}
