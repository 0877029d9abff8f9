//! Core data models for the livability engine.
//!
//! This module contains all the domain models used throughout the engine.

mod affordability;
mod audit;
mod bedroom_standard;
mod dependent_status;
mod grade;
mod location;
mod neighborhood;

pub use affordability::{
    AffordabilityRating, AffordabilityResult, AllowanceSource, CandidateScore, CandidateScores,
    RentSource,
};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use bedroom_standard::BedroomStandard;
pub use dependent_status::DependentStatus;
pub use grade::Grade;
pub use location::{CountyFips, MhaCode, ZipCode};
pub use neighborhood::{LivabilityScore, LivabilityWeights, NeighborhoodMetrics, ScoreComponents};
