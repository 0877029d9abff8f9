//! HTTP API module for the livability engine.
//!
//! This module exposes affordability rating, candidate scoring and
//! neighborhood livability ranking as JSON endpoints over shared,
//! read-only reference tables.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AffordabilityRequest, CandidatesRequest, LivabilityRequest, MemberProfile};
pub use response::{
    AffordabilityResponse, ApiError, CalculationInfo, CandidatesResponse, DatasetResponse,
    LivabilityResponse,
};
pub use state::AppState;
