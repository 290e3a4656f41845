use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use hapetus_domain::auth::AuthenticatedUser;
use hapetus_domain::entities::dto::{
    CreatedEnvelope, DailyMeasurementDto, DataEnvelope, MessageEnvelope, UpdateDailyMeasurementDto,
};

use super::json_body;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// List the caller's daily measurements, newest first
#[utoipa::path(
    get,
    path = "/api/daily",
    responses(
        (status = 200, description = "Daily measurements wrapped in `data`", body = [DailyMeasurementDto]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "daily"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_daily(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state.measurements.list_daily(&user.user_id).await?;
    Ok(Json(DataEnvelope { data }))
}

/// Record a daily measurement
#[utoipa::path(
    post,
    path = "/api/daily",
    request_body = DailyMeasurementDto,
    responses(
        (status = 201, description = "Measurement created, returned with `message` and `data`", body = DailyMeasurementDto),
        (status = 400, description = "Invalid measurement", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "daily"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_daily(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<DailyMeasurementDto>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let dto = json_body(payload)?;
    let created = state.measurements.create_daily(&user.user_id, dto).await?;
    info!("Daily measurement {} created", created.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope {
            message: "Measurement saved".to_string(),
            data: created,
        }),
    ))
}

/// Correct fields of an existing daily measurement
#[utoipa::path(
    put,
    path = "/api/daily/{id}",
    params(
        ("id" = String, Path, description = "Measurement ID")
    ),
    request_body = UpdateDailyMeasurementDto,
    responses(
        (status = 200, description = "Measurement updated", body = MessageEnvelope),
        (status = 400, description = "Invalid measurement", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Measurement belongs to another user", body = ErrorResponse),
        (status = 404, description = "Measurement not found", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "daily"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn update_daily(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDailyMeasurementDto>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let update = json_body(payload)?;
    state.measurements.update_daily(&user.user_id, &id, update).await?;
    Ok(Json(MessageEnvelope::new("Measurement updated")))
}

/// Delete a daily measurement
#[utoipa::path(
    delete,
    path = "/api/daily/{id}",
    params(
        ("id" = String, Path, description = "Measurement ID")
    ),
    responses(
        (status = 200, description = "Measurement deleted", body = MessageEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Measurement belongs to another user", body = ErrorResponse),
        (status = 404, description = "Measurement not found", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "daily"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_daily(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state.measurements.delete_daily(&user.user_id, &id).await?;
    Ok(Json(MessageEnvelope::new("Measurement deleted")))
}
