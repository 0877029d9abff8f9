//! HTTP request handlers for the livability engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    attach_affordability, rank_neighborhoods, rate_affordability, score_candidates,
    score_neighborhoods,
};
use crate::error::EngineError;

use super::request::{AffordabilityRequest, CandidatesRequest, LivabilityRequest};
use super::response::{
    AffordabilityResponse, ApiError, ApiErrorResponse, CalculationInfo, CandidatesResponse,
    DatasetResponse, LivabilityResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/affordability", post(affordability_handler))
        .route("/affordability/candidates", post(candidates_handler))
        .route("/livability", post(livability_handler))
        .route("/dataset", get(dataset_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // serde's message names the offending field
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /affordability.
///
/// Rates one candidate ZIP against the allowance at the duty ZIP.
async fn affordability_handler(
    State(state): State<AppState>,
    payload: Result<Json<AffordabilityRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing affordability request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let (member, candidate_zip) = match request.parse() {
        Ok(parsed) => parsed,
        Err(err) => return error_response(correlation_id, err),
    };

    let tables = state.tables();
    let start_time = Instant::now();
    match rate_affordability(
        tables,
        &member.duty_zip,
        &candidate_zip,
        member.dependent_status,
        member.grade,
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                duty_zip = %member.duty_zip,
                candidate_zip = %candidate_zip,
                grade = %member.grade,
                rent_tier = result.rent_source.label(),
                ratio = %result.ratio.round_dp(4),
                rating = result.rating.value(),
                duration_us = start_time.elapsed().as_micros(),
                "Affordability rated"
            );
            json_response(
                StatusCode::OK,
                AffordabilityResponse {
                    info: CalculationInfo::new(correlation_id, tables),
                    result,
                },
            )
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /affordability/candidates.
///
/// Rates a list of candidate ZIPs against one duty allowance.
async fn candidates_handler(
    State(state): State<AppState>,
    payload: Result<Json<CandidatesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing candidate scoring request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let (member, candidates) = match request.parse() {
        Ok(parsed) => parsed,
        Err(err) => return error_response(correlation_id, err),
    };

    let tables = state.tables();
    let start_time = Instant::now();
    match score_candidates(
        tables,
        &member.duty_zip,
        &candidates,
        member.dependent_status,
        member.grade,
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                duty_zip = %member.duty_zip,
                candidates = candidates.len(),
                allowance = %result.allowance,
                duration_us = start_time.elapsed().as_micros(),
                "Candidates scored"
            );
            json_response(
                StatusCode::OK,
                CandidatesResponse {
                    info: CalculationInfo::new(correlation_id, tables),
                    result,
                },
            )
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /livability.
///
/// Scores and ranks neighborhoods. Neighborhoods with a ZIP but no
/// affordability ratio are rated against the duty ZIP first.
async fn livability_handler(
    State(state): State<AppState>,
    payload: Result<Json<LivabilityRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing livability request");

    let mut request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let member = match request.parse() {
        Ok(member) => member,
        Err(err) => return error_response(correlation_id, err),
    };

    let tables = state.tables();
    let start_time = Instant::now();
    let attached = match attach_affordability(
        tables,
        &member.duty_zip,
        member.dependent_status,
        member.grade,
        &mut request.neighborhoods,
    ) {
        Ok(attached) => attached,
        Err(err) => return error_response(correlation_id, err),
    };

    let scores = match score_neighborhoods(&request.neighborhoods, &request.weights) {
        Ok(scores) => scores,
        Err(err) => return error_response(correlation_id, err),
    };
    let total = scores.len();
    let ranked = rank_neighborhoods(scores, request.limit.unwrap_or(total));

    info!(
        correlation_id = %correlation_id,
        duty_zip = %member.duty_zip,
        neighborhoods = total,
        affordability_attached = attached,
        returned = ranked.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Neighborhoods ranked"
    );

    json_response(
        StatusCode::OK,
        LivabilityResponse {
            info: CalculationInfo::new(correlation_id, tables),
            duty_zip: member.duty_zip,
            weights: request.weights,
            total_neighborhoods: total,
            affordability_attached: attached,
            scores: ranked,
        },
    )
}

/// Handler for GET /dataset.
async fn dataset_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, DatasetResponse::from(state.tables()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::synthetic_tables;
    use axum::{body::Body, http::Request};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_router() -> Router {
        create_router(AppState::new(synthetic_tables()))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_affordability_returns_result_with_identity() {
        let body = json!({
            "duty_zip": "20001",
            "candidate_zip": "22201",
            "dependent_status": "W",
            "grade": "O04"
        });
        let (status, json) = send(create_test_router(), "POST", "/affordability", Some(body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["calculation_id"].is_string());
        assert!(json["timestamp"].is_string());
        assert_eq!(json["engine_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["dataset_year"], 2023);
        let ratio: rust_decimal::Decimal = json["ratio"].as_str().unwrap().parse().unwrap();
        assert_eq!(ratio, rust_decimal::Decimal::new(125, 2));
        assert_eq!(json["rating"], 5);
        assert_eq!(json["rent_source"]["tier"], "zip");
        assert_eq!(json["allowance_source"]["kind"], "housing_area");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, json) = send(
            create_test_router(),
            "POST",
            "/affordability",
            Some("{ not json".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let body = json!({ "duty_zip": "20001", "dependent_status": "W", "grade": "O04" });
        let (status, json) = send(create_test_router(), "POST", "/affordability", Some(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_grade_returns_400() {
        let body = json!({
            "duty_zip": "20001",
            "candidate_zip": "22201",
            "dependent_status": "W",
            "grade": "GENERAL"
        });
        let (status, json) = send(create_test_router(), "POST", "/affordability", Some(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "UNKNOWN_GRADE");
    }

    #[tokio::test]
    async fn test_candidates_keep_input_order() {
        let body = json!({
            "duty_zip": "20001",
            "candidate_zips": ["55555", "22201"],
            "dependent_status": "W",
            "grade": "O04"
        });
        let (status, json) = send(
            create_test_router(),
            "POST",
            "/affordability/candidates",
            Some(body.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scores"][0]["zip"], "55555");
        assert_eq!(json["scores"][0]["rent_source"]["tier"], "national_average");
        assert_eq!(json["scores"][1]["zip"], "22201");
        assert_eq!(json["scores"][1]["rating"], 5);
    }

    #[tokio::test]
    async fn test_livability_ranks_and_limits() {
        let body = json!({
            "duty_zip": "20001",
            "dependent_status": "W",
            "grade": "O04",
            "limit": 1,
            "neighborhoods": [
                { "id": "far", "zip": "22201", "crime_index": "1", "distance": "0.3", "walkability": "10" },
                { "id": "near", "zip": "22201", "crime_index": "1", "distance": "0.01", "walkability": "10" }
            ]
        });
        let (status, json) = send(create_test_router(), "POST", "/livability", Some(body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_neighborhoods"], 2);
        assert_eq!(json["affordability_attached"], 2);
        assert_eq!(json["scores"].as_array().unwrap().len(), 1);
        assert_eq!(json["scores"][0]["id"], "near");
    }

    #[tokio::test]
    async fn test_livability_rejects_weight_above_ten() {
        let body = json!({
            "duty_zip": "20001",
            "dependent_status": "W",
            "grade": "O04",
            "weights": { "crime": 11 },
            "neighborhoods": []
        });
        let (status, json) = send(create_test_router(), "POST", "/livability", Some(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_dataset_reports_metadata() {
        let (status, json) = send(create_test_router(), "GET", "/dataset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "synthetic");
        assert_eq!(json["tables"]["county_rents"], 2);
    }
}
