//! Fair market rent lookup.
//!
//! Rent is resolved through three tiers, in strict order:
//! 1. the Small Area FMR published for the ZIP,
//! 2. the county FMR for the county the ZIP lies in,
//! 3. the national average for the bedroom count.
//!
//! The first two tiers report a typed [`RentTierMiss`] when they cannot
//! answer; the last tier always answers, so the lookup never fails.

use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateTables;
use crate::models::{AuditStep, AuditWarning, BedroomStandard, CountyFips, RentSource, ZipCode};

/// Reference for fair market rent lookups.
pub const RENT_REFERENCE: &str = "HUD Fair Market Rents";

/// Why a rent tier could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentTierMiss {
    /// The ZIP has no Small Area FMR row.
    ZipNotListed,
    /// The ZIP's row has no value for the bedroom count.
    ZipBedroomUnpublished,
    /// The ZIP is not in the county crosswalk.
    CountyNotMapped,
    /// The ZIP's county has no FMR row.
    CountyNotListed {
        /// The county the ZIP maps to.
        fips: CountyFips,
    },
    /// The county's row has no value for the bedroom count.
    CountyBedroomUnpublished {
        /// The county the ZIP maps to.
        fips: CountyFips,
    },
}

impl RentTierMiss {
    /// Returns a stable code for audit output.
    pub fn code(&self) -> &'static str {
        match self {
            RentTierMiss::ZipNotListed => "zip_not_listed",
            RentTierMiss::ZipBedroomUnpublished => "zip_bedroom_unpublished",
            RentTierMiss::CountyNotMapped => "county_not_mapped",
            RentTierMiss::CountyNotListed { .. } => "county_not_listed",
            RentTierMiss::CountyBedroomUnpublished { .. } => "county_bedroom_unpublished",
        }
    }
}

impl fmt::Display for RentTierMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentTierMiss::ZipNotListed => f.write_str("no ZIP-level rent row"),
            RentTierMiss::ZipBedroomUnpublished => {
                f.write_str("ZIP-level row has no rent for this bedroom count")
            }
            RentTierMiss::CountyNotMapped => f.write_str("ZIP is not mapped to a county"),
            RentTierMiss::CountyNotListed { fips } => write!(f, "county {} has no rent row", fips),
            RentTierMiss::CountyBedroomUnpublished { fips } => {
                write!(f, "county {} has no rent for this bedroom count", fips)
            }
        }
    }
}

/// A rent resolved through the tier chain, without audit detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRent {
    /// The monthly fair market rent.
    pub rent: Decimal,
    /// The tier that answered.
    pub source: RentSource,
    /// Why each earlier tier could not answer.
    pub misses: Vec<RentTierMiss>,
}

impl ResolvedRent {
    /// Returns a warning when the rent did not come from the ZIP tier.
    pub fn warning(&self, zip: &ZipCode) -> Option<AuditWarning> {
        match &self.source {
            RentSource::Zip => None,
            RentSource::County { fips } => Some(AuditWarning::new(
                "RENT_COUNTY_FALLBACK",
                format!("No ZIP-level rent for {}; used county {}", zip, fips),
                "low",
            )),
            RentSource::NationalAverage => Some(AuditWarning::new(
                "RENT_NATIONAL_AVERAGE",
                format!("No ZIP or county rent for {}; used the national average", zip),
                "medium",
            )),
        }
    }
}

fn zip_tier(
    tables: &RateTables,
    zip: &ZipCode,
    bedrooms: BedroomStandard,
) -> Result<Decimal, RentTierMiss> {
    tables
        .zip_rents(zip)
        .ok_or(RentTierMiss::ZipNotListed)?
        .get(bedrooms)
        .ok_or(RentTierMiss::ZipBedroomUnpublished)
}

fn county_tier(
    tables: &RateTables,
    zip: &ZipCode,
    bedrooms: BedroomStandard,
) -> Result<(Decimal, CountyFips), RentTierMiss> {
    let fips = tables
        .county_for_zip(zip)
        .ok_or(RentTierMiss::CountyNotMapped)?;
    let rents = tables
        .county_rents(fips)
        .ok_or_else(|| RentTierMiss::CountyNotListed { fips: fips.clone() })?;
    let rent = rents
        .get(bedrooms)
        .ok_or_else(|| RentTierMiss::CountyBedroomUnpublished { fips: fips.clone() })?;
    Ok((rent, fips.clone()))
}

/// Resolves the fair market rent for a ZIP and bedroom count.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use livability_engine::calculation::resolve_fair_market_rent;
/// use livability_engine::config::{DatasetMetadata, RateTables};
/// use livability_engine::models::{BedroomStandard, RentSource, ZipCode};
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::builder(DatasetMetadata {
///     name: "empty".to_string(),
///     year: 2023,
///     effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
///     allowance_source: String::new(),
///     rent_source: String::new(),
/// })
/// .build();
///
/// let zip = ZipCode::new("99999").unwrap();
/// let resolved = resolve_fair_market_rent(&tables, &zip, BedroomStandard::Two);
/// assert_eq!(resolved.rent, Decimal::new(1096, 0));
/// assert_eq!(resolved.source, RentSource::NationalAverage);
/// ```
pub fn resolve_fair_market_rent(
    tables: &RateTables,
    zip: &ZipCode,
    bedrooms: BedroomStandard,
) -> ResolvedRent {
    let mut misses = Vec::new();

    match zip_tier(tables, zip, bedrooms) {
        Ok(rent) => {
            return ResolvedRent {
                rent,
                source: RentSource::Zip,
                misses,
            };
        }
        Err(miss) => {
            debug!(zip = %zip, bedrooms = bedrooms.count(), miss = %miss, "ZIP rent tier missed");
            misses.push(miss);
        }
    }

    match county_tier(tables, zip, bedrooms) {
        Ok((rent, fips)) => {
            return ResolvedRent {
                rent,
                source: RentSource::County { fips },
                misses,
            };
        }
        Err(miss) => {
            debug!(zip = %zip, bedrooms = bedrooms.count(), miss = %miss, "County rent tier missed");
            misses.push(miss);
        }
    }

    ResolvedRent {
        rent: tables.national_average_rents().get(bedrooms),
        source: RentSource::NationalAverage,
        misses,
    }
}

/// The result of a rent lookup, including the audit step.
#[derive(Debug, Clone)]
pub struct RentLookupResult {
    /// The resolved rent and its provenance.
    pub resolved: ResolvedRent,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

impl RentLookupResult {
    /// The monthly fair market rent.
    pub fn rent(&self) -> Decimal {
        self.resolved.rent
    }

    /// The tier that answered.
    pub fn source(&self) -> &RentSource {
        &self.resolved.source
    }
}

/// Looks up the fair market rent for a ZIP and bedroom count and records an
/// audit step. Never fails.
pub fn lookup_fair_market_rent(
    tables: &RateTables,
    zip: &ZipCode,
    bedrooms: BedroomStandard,
    step_number: u32,
) -> RentLookupResult {
    let resolved = resolve_fair_market_rent(tables, zip, bedrooms);

    let misses: Vec<serde_json::Value> = resolved
        .misses
        .iter()
        .map(|m| serde_json::json!({ "code": m.code(), "detail": m.to_string() }))
        .collect();

    let mut output = serde_json::json!({
        "rent": resolved.rent.normalize().to_string(),
        "tier": resolved.source.label(),
        "tier_misses": misses
    });
    if let RentSource::County { fips } = &resolved.source {
        output["county_fips"] = serde_json::json!(fips.as_str());
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "fair_market_rent_lookup".to_string(),
        rule_name: "Fair Market Rent Lookup".to_string(),
        reference: RENT_REFERENCE.to_string(),
        input: serde_json::json!({
            "zip_code": zip.as_str(),
            "bedrooms": bedrooms.count()
        }),
        output,
        reasoning: format!(
            "{} rent for {} at {} tier: ${}",
            bedrooms,
            zip,
            resolved.source.label(),
            resolved.rent.normalize()
        ),
    };

    RentLookupResult {
        resolved,
        audit_step,
    }
}
