use axum::{extract::rejection::JsonRejection, response::IntoResponse, Json};
use tracing::{debug, instrument};
use validator::Validate;

use hapetus_domain::entities::dto::{ClassificationResponse, ClassifyRequest, DataEnvelope};
use hapetus_domain::errors::ServiceError;
use hapetus_domain::guidelines::all_guidelines;
use hapetus_domain::services::{classify, recommendations};

use super::json_body;
use crate::entities::common::ErrorResponse;

/// Classify a blood pressure reading without storing it.
///
/// Age defaults to 50 when omitted.
#[utoipa::path(
    post,
    path = "/api/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Classification and advice wrapped in `data`", body = ClassificationResponse),
        (status = 400, description = "Reading out of range", body = ErrorResponse),
    ),
    tag = "guidelines"
)]
#[instrument(skip(payload))]
pub async fn classify_reading(
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = json_body(payload)?;
    request.validate().map_err(ServiceError::from)?;

    let classification = classify(request.systolic, request.diastolic, request.age, request.gender);
    debug!(
        "Classified {}/{} as {}",
        request.systolic, request.diastolic, classification.category
    );
    let advice = recommendations(request.age, request.gender, classification.category);

    Ok(Json(DataEnvelope {
        data: ClassificationResponse {
            classification,
            recommendations: advice,
        },
    }))
}

/// Export every guideline table
#[utoipa::path(
    get,
    path = "/api/guidelines",
    responses(
        (status = 200, description = "All guideline tables wrapped in `data`", body = serde_json::Value),
    ),
    tag = "guidelines"
)]
pub async fn list_guidelines() -> impl IntoResponse {
    Json(DataEnvelope { data: all_guidelines() })
}
