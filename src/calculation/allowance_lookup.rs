//! Housing allowance lookup.
//!
//! The published rate is found through ZIP → Military Housing Area →
//! (dependent status, grade). When that chain breaks the allowance is
//! estimated as a fixed fraction of the fair market rent at the same ZIP,
//! for the member's bedroom standard.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::bedroom_standard::bedroom_standard;
use super::rent_lookup::{RENT_REFERENCE, ResolvedRent, resolve_fair_market_rent};
use crate::config::RateTables;
use crate::models::{
    AllowanceSource, AuditStep, AuditWarning, DependentStatus, Grade, MhaCode, ZipCode,
};

/// Reference for published allowance rates.
pub const ALLOWANCE_REFERENCE: &str = "DTMO BAH rate tables";

/// Why the published allowance could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowanceMiss {
    /// The ZIP is not assigned to any housing area.
    ZipNotInHousingArea,
    /// The housing area has no rate row for the dependent status.
    StatusNotPublished {
        /// The housing area the ZIP belongs to.
        mha: MhaCode,
    },
    /// The housing area's row has no rate for the grade.
    GradeNotPublished {
        /// The housing area the ZIP belongs to.
        mha: MhaCode,
    },
}

impl AllowanceMiss {
    /// Returns a stable code for audit output.
    pub fn code(&self) -> &'static str {
        match self {
            AllowanceMiss::ZipNotInHousingArea => "zip_not_in_housing_area",
            AllowanceMiss::StatusNotPublished { .. } => "status_not_published",
            AllowanceMiss::GradeNotPublished { .. } => "grade_not_published",
        }
    }

    /// True when the ZIP is assigned to a housing area whose rates are
    /// incomplete, which points at a defect in the reference data.
    pub fn is_data_defect(&self) -> bool {
        !matches!(self, AllowanceMiss::ZipNotInHousingArea)
    }
}

impl fmt::Display for AllowanceMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowanceMiss::ZipNotInHousingArea => {
                f.write_str("ZIP is not assigned to a military housing area")
            }
            AllowanceMiss::StatusNotPublished { mha } => {
                write!(f, "housing area {} has no rates for this dependent status", mha)
            }
            AllowanceMiss::GradeNotPublished { mha } => {
                write!(f, "housing area {} has no rate for this grade", mha)
            }
        }
    }
}

fn housing_area_rate<'a>(
    tables: &'a RateTables,
    zip: &ZipCode,
    status: DependentStatus,
    grade: Grade,
) -> Result<(Decimal, &'a MhaCode), AllowanceMiss> {
    let mha = tables
        .housing_area(zip)
        .ok_or(AllowanceMiss::ZipNotInHousingArea)?;
    let rates = tables
        .allowance_rates(mha, status)
        .ok_or_else(|| AllowanceMiss::StatusNotPublished { mha: mha.clone() })?;
    let rate = rates
        .get(grade)
        .ok_or_else(|| AllowanceMiss::GradeNotPublished { mha: mha.clone() })?;
    Ok((rate, mha))
}

/// The result of an allowance lookup, including audit detail.
#[derive(Debug, Clone)]
pub struct AllowanceLookupResult {
    /// The monthly allowance.
    pub rate: Decimal,
    /// Where the allowance came from.
    pub source: AllowanceSource,
    /// Why the published rate could not be used, if it could not.
    pub miss: Option<AllowanceMiss>,
    /// The audit steps recording this lookup.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised by fallbacks.
    pub warnings: Vec<AuditWarning>,
}

/// Looks up the monthly housing allowance for a ZIP, dependent status and
/// grade.
///
/// Falls back to `proxy_factor × fair market rent` on any miss, so this never
/// fails. Audit steps are numbered from `step_number`.
pub fn lookup_allowance(
    tables: &RateTables,
    zip: &ZipCode,
    status: DependentStatus,
    grade: Grade,
    step_number: u32,
) -> AllowanceLookupResult {
    let input = serde_json::json!({
        "zip_code": zip.as_str(),
        "dependent_status": status.code(),
        "grade": grade.code()
    });

    let miss = match housing_area_rate(tables, zip, status, grade) {
        Ok((rate, mha)) => {
            let name = tables.housing_area_name(mha).map(str::to_string);
            let audit_step = AuditStep {
                step_number,
                rule_id: "allowance_lookup".to_string(),
                rule_name: "Housing Allowance Lookup".to_string(),
                reference: ALLOWANCE_REFERENCE.to_string(),
                input,
                output: serde_json::json!({
                    "rate": rate.normalize().to_string(),
                    "mha": mha.as_str(),
                    "mha_name": name
                }),
                reasoning: format!(
                    "{} {} rate for {} in housing area {}: ${}",
                    grade,
                    status,
                    zip,
                    mha,
                    rate.normalize()
                ),
            };
            return AllowanceLookupResult {
                rate,
                source: AllowanceSource::HousingArea {
                    mha: mha.clone(),
                    name,
                },
                miss: None,
                audit_steps: vec![audit_step],
                warnings: Vec::new(),
            };
        }
        Err(miss) => miss,
    };

    if miss.is_data_defect() {
        warn!(zip = %zip, grade = %grade, status = %status, miss = %miss, "Published allowance incomplete; estimating from rent");
    } else {
        debug!(zip = %zip, miss = %miss, "No housing area for ZIP; estimating allowance from rent");
    }

    let bedrooms = bedroom_standard(grade, status);
    let factor = tables.allowance_proxy_factor();
    let resolved = resolve_fair_market_rent(tables, zip, bedrooms);
    let rate = factor * resolved.rent;

    let mut audit_steps = vec![AuditStep {
        step_number,
        rule_id: "allowance_lookup".to_string(),
        rule_name: "Housing Allowance Lookup".to_string(),
        reference: ALLOWANCE_REFERENCE.to_string(),
        input,
        output: serde_json::json!({
            "miss": miss.code(),
            "detail": miss.to_string()
        }),
        reasoning: format!("No published allowance for {}: {}", zip, miss),
    }];
    audit_steps.push(proxy_step(
        step_number + 1,
        zip,
        bedrooms.count(),
        factor,
        rate,
        &resolved,
    ));

    let mut warnings = vec![AuditWarning::new(
        "ALLOWANCE_RENT_PROXY",
        format!(
            "Allowance for {} estimated as {} x fair market rent ({})",
            zip,
            factor.normalize(),
            miss
        ),
        if miss.is_data_defect() { "high" } else { "medium" },
    )];
    warnings.extend(resolved.warning(zip));

    AllowanceLookupResult {
        rate,
        source: AllowanceSource::RentProxy {
            factor,
            rent_source: resolved.source,
        },
        miss: Some(miss),
        audit_steps,
        warnings,
    }
}

fn proxy_step(
    step_number: u32,
    zip: &ZipCode,
    bedrooms: u8,
    factor: Decimal,
    rate: Decimal,
    resolved: &ResolvedRent,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "allowance_rent_proxy".to_string(),
        rule_name: "Allowance Rent Proxy".to_string(),
        reference: RENT_REFERENCE.to_string(),
        input: serde_json::json!({
            "zip_code": zip.as_str(),
            "bedrooms": bedrooms,
            "factor": factor.normalize().to_string()
        }),
        output: serde_json::json!({
            "rate": rate.normalize().to_string(),
            "rent": resolved.rent.normalize().to_string(),
            "rent_tier": resolved.source.label()
        }),
        reasoning: format!(
            "{} x ${} ({} rent) = ${}",
            factor.normalize(),
            resolved.rent.normalize(),
            resolved.source.label(),
            rate.normalize()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::{dollars, fips, synthetic_tables, zip};
    use crate::models::RentSource;

    #[test]
    fn test_published_rate_from_housing_area() {
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("20001"),
            DependentStatus::WithDependents,
            Grade::O4,
            1,
        );

        assert_eq!(result.rate, dollars(2500));
        assert_eq!(
            result.source,
            AllowanceSource::HousingArea {
                mha: MhaCode::new("DC053"),
                name: Some("WASHINGTON, DC METRO AREA".to_string()),
            }
        );
        assert!(result.miss.is_none());
        assert!(result.warnings.is_empty());
        assert_eq!(result.audit_steps.len(), 1);
        assert_eq!(result.audit_steps[0].output["mha"], "DC053");
    }

    #[test]
    fn test_dependent_status_selects_table() {
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("20001"),
            DependentStatus::WithoutDependents,
            Grade::O4,
            1,
        );
        assert_eq!(result.rate, dollars(2400));
    }

    #[test]
    fn test_proxy_uses_county_rent_when_zip_unassigned() {
        // 21202: no MHA, no ZIP rent; county 24510 3BR = 1650.
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("21202"),
            DependentStatus::WithDependents,
            Grade::O4,
            1,
        );

        assert_eq!(result.rate, Decimal::new(1485, 0));
        assert_eq!(result.miss, Some(AllowanceMiss::ZipNotInHousingArea));
        assert_eq!(
            result.source,
            AllowanceSource::RentProxy {
                factor: Decimal::new(9, 1),
                rent_source: RentSource::County { fips: fips("24510") },
            }
        );
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[1].step_number, 2);
        assert_eq!(result.audit_steps[1].output["rent_tier"], "county");
        assert_eq!(result.warnings[0].code, "ALLOWANCE_RENT_PROXY");
        assert_eq!(result.warnings[0].severity, "medium");
        assert_eq!(result.warnings[1].code, "RENT_COUNTY_FALLBACK");
    }

    #[test]
    fn test_proxy_bottoms_out_at_national_average() {
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("88888"),
            DependentStatus::WithoutDependents,
            Grade::E1,
            1,
        );

        // 0.9 x 880
        assert_eq!(result.rate, Decimal::new(792, 0));
        assert!(matches!(
            result.source,
            AllowanceSource::RentProxy {
                rent_source: RentSource::NationalAverage,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_grade_in_housing_area_is_data_defect() {
        // 22203 maps to ZZ999, which has no published rates at all.
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("22203"),
            DependentStatus::WithDependents,
            Grade::O4,
            1,
        );

        assert_eq!(
            result.miss,
            Some(AllowanceMiss::StatusNotPublished {
                mha: MhaCode::new("ZZ999")
            })
        );
        // 0.9 x national 3BR 1416
        assert_eq!(result.rate, Decimal::new(12744, 1));
        assert_eq!(result.warnings[0].severity, "high");
    }

    #[test]
    fn test_grade_gap_in_published_row() {
        let tables = synthetic_tables();
        let result = lookup_allowance(
            &tables,
            &zip("20001"),
            DependentStatus::WithDependents,
            Grade::E1,
            1,
        );

        assert_eq!(
            result.miss,
            Some(AllowanceMiss::GradeNotPublished {
                mha: MhaCode::new("DC053")
            })
        );
        // 0.9 x ZIP 2BR 2100
        assert_eq!(result.rate, Decimal::new(1890, 0));
    }

    #[test]
    fn test_proxy_factor_override() {
        let tables = RateTables::builder(crate::config::fixtures::metadata())
            .allowance_proxy_factor(Decimal::ONE)
            .build();
        let result = lookup_allowance(
            &tables,
            &zip("99999"),
            DependentStatus::WithDependents,
            Grade::O4,
            1,
        );
        assert_eq!(result.rate, dollars(1416));
    }
}
