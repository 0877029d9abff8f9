//! Affordability rating.
//!
//! Affordability compares the housing allowance at the duty location with the
//! fair market rent at a candidate ZIP, using the member's bedroom standard
//! for both sides. The ratio is reported unrounded together with a discrete
//! 0-5 rating.

use std::time::Instant;

use rust_decimal::Decimal;

use super::allowance_lookup::lookup_allowance;
use super::bedroom_standard::resolve_bedroom_standard;
use super::rent_lookup::{lookup_fair_market_rent, resolve_fair_market_rent};
use crate::config::RateTables;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AffordabilityRating, AffordabilityResult, AuditStep, AuditTrace, CandidateScore,
    CandidateScores, DependentStatus, Grade, RentSource, ZipCode,
};

/// Reference for the rating bands.
pub const RATING_REFERENCE: &str = "Allowance to rent ratio bands";

/// Maps an allowance/rent ratio onto the 0-5 rating scale.
///
/// | Ratio | Rating |
/// |---|---|
/// | below 0.5 | 0 |
/// | 0.5 to 0.65 | 1 |
/// | above 0.65 to 0.9 | 2 |
/// | above 0.9, below 1 | 3 |
/// | exactly 1 | 4 |
/// | above 1 | 5 |
///
/// # Examples
///
/// ```
/// use livability_engine::calculation::affordability_rating;
/// use rust_decimal::Decimal;
///
/// assert_eq!(affordability_rating(Decimal::new(5, 1)).value(), 1);
/// assert_eq!(affordability_rating(Decimal::ONE).value(), 4);
/// assert_eq!(affordability_rating(Decimal::new(125, 2)).value(), 5);
/// ```
pub fn affordability_rating(ratio: Decimal) -> AffordabilityRating {
    let value = if ratio < Decimal::new(5, 1) {
        0
    } else if ratio <= Decimal::new(65, 2) {
        1
    } else if ratio <= Decimal::new(9, 1) {
        2
    } else if ratio < Decimal::ONE {
        3
    } else if ratio == Decimal::ONE {
        4
    } else {
        5
    };
    AffordabilityRating::new(value)
}

/// Divides allowance by rent.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the rent is not positive or
/// the division overflows.
pub fn affordability_ratio(allowance: Decimal, rent: Decimal) -> EngineResult<Decimal> {
    if rent <= Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!("Cannot compute affordability against rent of {}", rent),
        });
    }
    allowance
        .checked_div(rent)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("Affordability ratio {} / {} overflowed", allowance, rent),
        })
}

fn rating_step(
    step_number: u32,
    allowance: Decimal,
    rent: Decimal,
    ratio: Decimal,
    rating: AffordabilityRating,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "affordability_rating".to_string(),
        rule_name: "Affordability Rating".to_string(),
        reference: RATING_REFERENCE.to_string(),
        input: serde_json::json!({
            "allowance": allowance.normalize().to_string(),
            "rent": rent.normalize().to_string()
        }),
        output: serde_json::json!({
            "ratio": ratio.normalize().to_string(),
            "rating": rating.value()
        }),
        reasoning: format!(
            "${} / ${} = {} (rating {})",
            allowance.normalize(),
            rent.normalize(),
            ratio.round_dp(4).normalize(),
            rating
        ),
    }
}

/// Rates how affordable a candidate ZIP is for a member stationed at a duty
/// ZIP.
///
/// The bedroom standard is resolved once and used for both the allowance
/// fallback and the candidate rent. Missing reference data never fails the
/// rating; the sources and warnings on the result show which fallbacks were
/// used.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the resolved rent is not
/// positive, which validated tables cannot produce.
pub fn rate_affordability(
    tables: &RateTables,
    duty_zip: &ZipCode,
    candidate_zip: &ZipCode,
    status: DependentStatus,
    grade: Grade,
) -> EngineResult<AffordabilityResult> {
    let start_time = Instant::now();
    let mut trace = AuditTrace::default();

    let bedrooms = resolve_bedroom_standard(grade, status, trace.next_step_number());
    trace.steps.push(bedrooms.audit_step);
    let bedroom_standard = bedrooms.standard;

    let allowance = lookup_allowance(tables, duty_zip, status, grade, trace.next_step_number());
    trace.steps.extend(allowance.audit_steps);
    trace.warnings.extend(allowance.warnings);

    let rent = lookup_fair_market_rent(
        tables,
        candidate_zip,
        bedroom_standard,
        trace.next_step_number(),
    );
    trace.steps.push(rent.audit_step);
    trace.warnings.extend(rent.resolved.warning(candidate_zip));

    let ratio = affordability_ratio(allowance.rate, rent.resolved.rent)?;
    let rating = affordability_rating(ratio);
    trace.steps.push(rating_step(
        trace.next_step_number(),
        allowance.rate,
        rent.resolved.rent,
        ratio,
        rating,
    ));

    trace.duration_us = start_time.elapsed().as_micros() as u64;

    Ok(AffordabilityResult {
        duty_zip: duty_zip.clone(),
        candidate_zip: candidate_zip.clone(),
        grade,
        dependent_status: status,
        bedroom_standard,
        allowance: allowance.rate,
        allowance_source: allowance.source,
        fair_market_rent: rent.resolved.rent,
        rent_source: rent.resolved.source,
        ratio,
        rating,
        audit_trace: trace,
    })
}

/// Rates every candidate ZIP against one duty ZIP.
///
/// The bedroom standard and duty allowance are resolved once; each candidate
/// then costs a single rent lookup. Scores are returned in input order. Per
/// candidate detail is summarised in one audit step rather than one step per
/// ZIP.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] under the same condition as
/// [`rate_affordability`].
pub fn score_candidates(
    tables: &RateTables,
    duty_zip: &ZipCode,
    candidates: &[ZipCode],
    status: DependentStatus,
    grade: Grade,
) -> EngineResult<CandidateScores> {
    let start_time = Instant::now();
    let mut trace = AuditTrace::default();

    let bedrooms = resolve_bedroom_standard(grade, status, trace.next_step_number());
    trace.steps.push(bedrooms.audit_step);
    let bedroom_standard = bedrooms.standard;

    let allowance = lookup_allowance(tables, duty_zip, status, grade, trace.next_step_number());
    trace.steps.extend(allowance.audit_steps);
    trace.warnings.extend(allowance.warnings);

    let mut scores = Vec::with_capacity(candidates.len());
    let (mut at_zip, mut at_county, mut at_national) = (0usize, 0usize, 0usize);

    for zip in candidates {
        let resolved = resolve_fair_market_rent(tables, zip, bedroom_standard);
        match resolved.source {
            RentSource::Zip => at_zip += 1,
            RentSource::County { .. } => at_county += 1,
            RentSource::NationalAverage => at_national += 1,
        }

        let ratio = affordability_ratio(allowance.rate, resolved.rent)?;
        scores.push(CandidateScore {
            zip: zip.clone(),
            fair_market_rent: resolved.rent,
            rent_source: resolved.source,
            ratio,
            rating: affordability_rating(ratio),
        });
    }

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "candidate_scoring".to_string(),
        rule_name: "Candidate Affordability Scoring".to_string(),
        reference: RATING_REFERENCE.to_string(),
        input: serde_json::json!({
            "candidates": candidates.len(),
            "bedrooms": bedroom_standard.count(),
            "allowance": allowance.rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "zip_tier": at_zip,
            "county_tier": at_county,
            "national_average_tier": at_national
        }),
        reasoning: format!(
            "Scored {} candidates: {} at ZIP, {} at county, {} at national average rent",
            candidates.len(),
            at_zip,
            at_county,
            at_national
        ),
    });

    trace.duration_us = start_time.elapsed().as_micros() as u64;

    Ok(CandidateScores {
        duty_zip: duty_zip.clone(),
        grade,
        dependent_status: status,
        bedroom_standard,
        allowance: allowance.rate,
        allowance_source: allowance.source,
        scores,
        audit_trace: trace,
    })
}
