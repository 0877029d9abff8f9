//! Weighted neighborhood livability score.
//!
//! Each metric is scaled onto a comparable range and multiplied by its user
//! weight:
//!
//! ```text
//! overall = - crime         * crime_index / 4.46
//!           - distance      * distance / 0.1
//!           + walkability   * walkability_index / 10
//!           + schools       * school_rating / 5
//!           + affordability * affordability_ratio
//!           + recreation    * brewery_count
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::affordability::score_candidates;
use crate::config::RateTables;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditWarning, DependentStatus, Grade, LivabilityScore, LivabilityWeights, NeighborhoodMetrics,
    ScoreComponents, ZipCode,
};

/// Divisor for the crime index (the national average index).
pub fn crime_scale() -> Decimal {
    Decimal::new(446, 2)
}

/// Divisor for distance in degrees.
pub fn distance_scale() -> Decimal {
    Decimal::new(1, 1)
}

/// Divisor for the 1-20 walkability index.
pub fn walkability_scale() -> Decimal {
    Decimal::new(10, 0)
}

/// Divisor for the 1-10 school rating.
pub fn school_scale() -> Decimal {
    Decimal::new(5, 0)
}

/// School rating assumed when a neighborhood has none.
pub fn default_school_rating() -> Decimal {
    Decimal::new(5, 0)
}

/// Crime index assumed outside any reporting place (the national average).
pub fn default_crime_index() -> Decimal {
    Decimal::new(446, 2)
}

/// Walkability index assumed for block groups missing from the index.
pub fn default_walkability() -> Decimal {
    Decimal::new(10, 0)
}

fn weighted(name: &str, weight: u8, value: Decimal, scale: Decimal) -> EngineResult<Decimal> {
    Decimal::from(weight)
        .checked_mul(value)
        .and_then(|v| v.checked_div(scale))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} contribution overflowed for value {}", name, value),
        })
}

/// Computes the livability score of one neighborhood.
///
/// A missing school rating counts as 5, a missing walkability index as 10
/// and a missing brewery count as 0. A missing crime index counts as the
/// national average and a missing affordability ratio contributes nothing;
/// both are reported as warnings on the score.
///
/// # Errors
///
/// Returns [`EngineError::InvalidWeight`] if any weight exceeds 10, or
/// [`EngineError::CalculationError`] if a contribution overflows.
///
/// # Examples
///
/// ```
/// use livability_engine::calculation::livability_score;
/// use livability_engine::models::{LivabilityWeights, NeighborhoodMetrics};
/// use rust_decimal::Decimal;
///
/// let metrics = NeighborhoodMetrics {
///     id: "block-1".to_string(),
///     zip: None,
///     crime_index: Some(Decimal::ZERO),
///     distance: Decimal::ZERO,
///     walkability: Some(Decimal::new(10, 0)),
///     school_rating: None,
///     brewery_count: None,
///     affordability_ratio: Some(Decimal::ONE),
/// };
///
/// let score = livability_score(&metrics, &LivabilityWeights::default()).unwrap();
/// // walkability 4, schools 7, affordability 10
/// assert_eq!(score.overall, Decimal::new(21, 0));
/// ```
pub fn livability_score(
    metrics: &NeighborhoodMetrics,
    weights: &LivabilityWeights,
) -> EngineResult<LivabilityScore> {
    weights.validate()?;
    let mut warnings = Vec::new();

    let crime_index = match metrics.crime_index {
        Some(index) => index,
        None => {
            warnings.push(AuditWarning::new(
                "CRIME_INDEX_MISSING",
                format!(
                    "Neighborhood {} has no crime index; national average {} assumed",
                    metrics.id,
                    default_crime_index()
                ),
                "low",
            ));
            default_crime_index()
        }
    };

    let affordability = match metrics.affordability_ratio {
        Some(ratio) => weighted("affordability", weights.affordability, ratio, Decimal::ONE)?,
        None => {
            warnings.push(AuditWarning::new(
                "AFFORDABILITY_MISSING",
                format!(
                    "Neighborhood {} has no affordability ratio; affordability not scored",
                    metrics.id
                ),
                "medium",
            ));
            Decimal::ZERO
        }
    };

    let components = ScoreComponents {
        crime: -weighted("crime", weights.crime, crime_index, crime_scale())?,
        distance: -weighted("distance", weights.distance, metrics.distance, distance_scale())?,
        walkability: weighted(
            "walkability",
            weights.walkability,
            metrics.walkability.unwrap_or_else(default_walkability),
            walkability_scale(),
        )?,
        schools: weighted(
            "schools",
            weights.schools,
            metrics.school_rating.unwrap_or_else(default_school_rating),
            school_scale(),
        )?,
        affordability,
        recreation: weighted(
            "recreation",
            weights.recreation,
            Decimal::from(metrics.brewery_count.unwrap_or(0)),
            Decimal::ONE,
        )?,
    };

    let overall = components.total().ok_or_else(|| EngineError::CalculationError {
        message: format!("Livability score overflowed for {}", metrics.id),
    })?;

    Ok(LivabilityScore {
        id: metrics.id.clone(),
        zip: metrics.zip.clone(),
        overall,
        components,
        warnings,
    })
}

/// Scores every neighborhood with the same weights, in input order.
pub fn score_neighborhoods(
    neighborhoods: &[NeighborhoodMetrics],
    weights: &LivabilityWeights,
) -> EngineResult<Vec<LivabilityScore>> {
    weights.validate()?;
    neighborhoods
        .iter()
        .map(|metrics| livability_score(metrics, weights))
        .collect()
}

/// Sorts scores best first and keeps the top `limit`.
///
/// Ties keep their input order.
pub fn rank_neighborhoods(mut scores: Vec<LivabilityScore>, limit: usize) -> Vec<LivabilityScore> {
    scores.sort_by(|a, b| b.overall.cmp(&a.overall));
    scores.truncate(limit);
    scores
}

/// Fills in the affordability ratio of every neighborhood that has a ZIP but
/// no ratio yet, rating each ZIP against the duty location.
///
/// Each distinct ZIP is rated once. Returns how many neighborhoods were
/// filled.
///
/// # Errors
///
/// Propagates [`EngineError::CalculationError`] from the affordability
/// scorer.
pub fn attach_affordability(
    tables: &RateTables,
    duty_zip: &ZipCode,
    status: DependentStatus,
    grade: Grade,
    neighborhoods: &mut [NeighborhoodMetrics],
) -> EngineResult<usize> {
    let mut candidates: Vec<ZipCode> = neighborhoods
        .iter()
        .filter(|n| n.affordability_ratio.is_none())
        .filter_map(|n| n.zip.clone())
        .collect();
    candidates.sort();
    candidates.dedup();

    if candidates.is_empty() {
        return Ok(0);
    }

    let table = score_candidates(tables, duty_zip, &candidates, status, grade)?;
    let ratios: HashMap<&ZipCode, Decimal> = table
        .scores
        .iter()
        .map(|score| (&score.zip, score.ratio))
        .collect();

    let mut filled = 0;
    for neighborhood in neighborhoods.iter_mut() {
        if neighborhood.affordability_ratio.is_some() {
            continue;
        }
        if let Some(ratio) = neighborhood.zip.as_ref().and_then(|zip| ratios.get(zip)) {
            neighborhood.affordability_ratio = Some(*ratio);
            filled += 1;
        }
    }

    debug!(
        duty_zip = %duty_zip,
        zips = candidates.len(),
        filled,
        "Attached affordability ratios to neighborhoods"
    );
    Ok(filled)
}
