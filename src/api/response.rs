//! Response types for the livability engine API.
//!
//! This module defines the success envelopes and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DatasetMetadata, NationalAverageRents, RateTables, TableSummary};
use crate::error::EngineError;
use crate::models::{AffordabilityResult, CandidateScores, LivabilityScore, LivabilityWeights, ZipCode};

/// Identifies one calculation and the data it ran against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationInfo {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation ran.
    pub timestamp: DateTime<Utc>,
    /// The engine version that produced the result.
    pub engine_version: String,
    /// The rate year of the loaded dataset.
    pub dataset_year: i32,
}

impl CalculationInfo {
    /// Stamps a new calculation against the loaded tables.
    pub fn new(calculation_id: Uuid, tables: &RateTables) -> Self {
        Self {
            calculation_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            dataset_year: tables.metadata().year,
        }
    }
}

/// Response body for `POST /affordability`.
#[derive(Debug, Clone, Serialize)]
pub struct AffordabilityResponse {
    /// Calculation identity.
    #[serde(flatten)]
    pub info: CalculationInfo,
    /// The affordability result.
    #[serde(flatten)]
    pub result: AffordabilityResult,
}

/// Response body for `POST /affordability/candidates`.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatesResponse {
    /// Calculation identity.
    #[serde(flatten)]
    pub info: CalculationInfo,
    /// The candidate score table.
    #[serde(flatten)]
    pub result: CandidateScores,
}

/// Response body for `POST /livability`.
#[derive(Debug, Clone, Serialize)]
pub struct LivabilityResponse {
    /// Calculation identity.
    #[serde(flatten)]
    pub info: CalculationInfo,
    /// The duty location ZIP.
    pub duty_zip: ZipCode,
    /// The weights applied.
    pub weights: LivabilityWeights,
    /// Neighborhoods scored before the limit was applied.
    pub total_neighborhoods: usize,
    /// Neighborhoods whose affordability ratio was computed by the engine.
    pub affordability_attached: usize,
    /// Ranked scores, best first.
    pub scores: Vec<LivabilityScore>,
}

/// Response body for `GET /dataset`.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetResponse {
    /// Dataset metadata.
    #[serde(flatten)]
    pub metadata: DatasetMetadata,
    /// Row counts of the loaded tables.
    pub tables: TableSummary,
    /// National average rents used as the last fallback.
    pub national_average_rents: NationalAverageRents,
    /// Multiplier for the allowance rent proxy.
    pub allowance_proxy_factor: Decimal,
    /// The engine version serving the data.
    pub engine_version: String,
}

impl From<&RateTables> for DatasetResponse {
    fn from(tables: &RateTables) -> Self {
        Self {
            metadata: tables.metadata().clone(),
            tables: tables.summary(),
            national_average_rents: *tables.national_average_rents(),
            allowance_proxy_factor: tables.allowance_proxy_factor(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn internal(error: ApiError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::TableParseError { .. } => ApiErrorResponse::internal(
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::UnknownGrade { code } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "UNKNOWN_GRADE",
                    message,
                    format!("'{}' is not one of the 27 pay grades (e.g. E05, WO2, O04)", code),
                ),
            ),
            EngineError::UnknownDependentStatus { code } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "UNKNOWN_DEPENDENT_STATUS",
                    message,
                    format!("'{}' must be \"W\" or \"WO\"", code),
                ),
            ),
            EngineError::InvalidZipCode { .. } | EngineError::InvalidCountyCode { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_LOCATION", message))
            }
            EngineError::InvalidBedroomStandard { .. } | EngineError::InvalidWeight { .. } => {
                ApiErrorResponse::bad_request(ApiError::validation_error(message))
            }
            EngineError::CalculationError { message } => ApiErrorResponse::internal(
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}
