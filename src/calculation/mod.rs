//! Calculation logic for the livability engine.
//!
//! This module contains the bedroom standard tables, the fair market rent
//! and housing allowance fallback chains, the affordability rating and the
//! weighted neighborhood livability score.

mod affordability;
mod allowance_lookup;
mod bedroom_standard;
mod livability;
mod rent_lookup;

pub use affordability::{
    RATING_REFERENCE, affordability_rating, affordability_ratio, rate_affordability,
    score_candidates,
};
pub use allowance_lookup::{
    ALLOWANCE_REFERENCE, AllowanceLookupResult, AllowanceMiss, lookup_allowance,
};
pub use bedroom_standard::{
    BEDROOM_STANDARD_REFERENCE, BedroomStandardResult, bedroom_standard, resolve_bedroom_standard,
};
pub use livability::{
    attach_affordability, crime_scale, default_crime_index, default_school_rating,
    default_walkability, distance_scale, livability_score, rank_neighborhoods, school_scale,
    score_neighborhoods, walkability_scale,
};
pub use rent_lookup::{
    RENT_REFERENCE, RentLookupResult, RentTierMiss, ResolvedRent, lookup_fair_market_rent,
    resolve_fair_market_rent,
};
