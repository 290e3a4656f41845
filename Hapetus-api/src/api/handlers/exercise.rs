use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use hapetus_domain::auth::AuthenticatedUser;
use hapetus_domain::entities::dto::{CreatedEnvelope, DataEnvelope, ExerciseMeasurementDto, MessageEnvelope};

use super::json_body;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/exercise",
    responses(
        (status = 200, description = "Exercise measurements wrapped in `data`", body = [ExerciseMeasurementDto]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "exercise"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state.measurements.list_exercise(&user.user_id).await?;
    Ok(Json(DataEnvelope { data }))
}

/// Record a before/after exercise pair
#[utoipa::path(
    post,
    path = "/api/exercise",
    request_body = ExerciseMeasurementDto,
    responses(
        (status = 201, description = "Measurement created, returned with `message` and `data`", body = ExerciseMeasurementDto),
        (status = 400, description = "Invalid measurement", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "exercise"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ExerciseMeasurementDto>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let dto = json_body(payload)?;
    let created = state.measurements.create_exercise(&user.user_id, dto).await?;
    info!("Exercise measurement {} created", created.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope {
            message: "Exercise measurement saved".to_string(),
            data: created,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/exercise/{id}",
    params(
        ("id" = String, Path, description = "Exercise measurement ID")
    ),
    responses(
        (status = 200, description = "Measurement deleted", body = MessageEnvelope),
        (status = 403, description = "Measurement belongs to another user", body = ErrorResponse),
        (status = 404, description = "Measurement not found", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "exercise"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state.measurements.delete_exercise(&user.user_id, &id).await?;
    Ok(Json(MessageEnvelope::new("Exercise measurement deleted")))
}
