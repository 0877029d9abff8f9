//! Neighborhood livability models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditWarning, ZipCode};
use crate::error::{EngineError, EngineResult};

/// Relative importance of each livability metric, each 0 through 10.
///
/// # Example
///
/// ```
/// use livability_engine::models::LivabilityWeights;
///
/// let weights = LivabilityWeights::default();
/// assert_eq!(weights.affordability, 10);
/// assert!(weights.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivabilityWeights {
    /// Weight of the walkability index.
    pub walkability: u8,
    /// Weight of the crime index (higher crime lowers the score).
    pub crime: u8,
    /// Weight of the allowance/rent ratio.
    pub affordability: u8,
    /// Weight of the school rating.
    pub schools: u8,
    /// Weight of the recreation (brewery) count.
    pub recreation: u8,
    /// Weight of the distance to the duty location (farther lowers the score).
    pub distance: u8,
}

impl LivabilityWeights {
    /// The largest accepted weight.
    pub const MAX_WEIGHT: u8 = 10;

    /// Rejects any weight above [`Self::MAX_WEIGHT`].
    pub fn validate(&self) -> EngineResult<()> {
        let weights = [
            ("walkability", self.walkability),
            ("crime", self.crime),
            ("affordability", self.affordability),
            ("schools", self.schools),
            ("recreation", self.recreation),
            ("distance", self.distance),
        ];

        match weights
            .iter()
            .find(|(_, value)| *value > Self::MAX_WEIGHT)
        {
            Some((name, value)) => Err(EngineError::InvalidWeight {
                name: name.to_string(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

impl Default for LivabilityWeights {
    fn default() -> Self {
        Self {
            walkability: 4,
            crime: 8,
            affordability: 10,
            schools: 7,
            recreation: 5,
            distance: 8,
        }
    }
}

/// Metrics for one neighborhood, already joined onto its ZIP by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodMetrics {
    /// Identifier of the neighborhood (e.g. a census block group id).
    pub id: String,
    /// The ZIP the neighborhood lies in, if known.
    #[serde(default)]
    pub zip: Option<ZipCode>,
    /// Crime index of the enclosing place, if the neighborhood lies in one.
    #[serde(default)]
    pub crime_index: Option<Decimal>,
    /// Distance from the neighborhood centroid to the duty location, in degrees.
    pub distance: Decimal,
    /// National walkability index (1-20), if the block group is indexed.
    #[serde(default)]
    pub walkability: Option<Decimal>,
    /// Average school rating (1-10), if rated.
    #[serde(default)]
    pub school_rating: Option<Decimal>,
    /// Number of breweries in the neighborhood's ZIP.
    #[serde(default)]
    pub brewery_count: Option<u32>,
    /// Allowance/rent ratio for the neighborhood's ZIP, if already computed.
    #[serde(default)]
    pub affordability_ratio: Option<Decimal>,
}

/// Weighted contribution of each metric to the overall score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Crime contribution (zero or negative).
    pub crime: Decimal,
    /// Distance contribution (zero or negative).
    pub distance: Decimal,
    /// Walkability contribution.
    pub walkability: Decimal,
    /// School contribution.
    pub schools: Decimal,
    /// Affordability contribution.
    pub affordability: Decimal,
    /// Recreation contribution.
    pub recreation: Decimal,
}

impl ScoreComponents {
    /// Sum of all contributions, or `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        [
            self.crime,
            self.distance,
            self.walkability,
            self.schools,
            self.affordability,
            self.recreation,
        ]
        .iter()
        .try_fold(Decimal::ZERO, |acc, part| acc.checked_add(*part))
    }
}

/// The livability score of a single neighborhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivabilityScore {
    /// Identifier of the neighborhood.
    pub id: String,
    /// The neighborhood's ZIP, if known.
    pub zip: Option<ZipCode>,
    /// The weighted overall score (higher is better).
    pub overall: Decimal,
    /// The per-metric contributions making up `overall`.
    pub components: ScoreComponents,
    /// Metrics that were missing and defaulted.
    pub warnings: Vec<AuditWarning>,
}
