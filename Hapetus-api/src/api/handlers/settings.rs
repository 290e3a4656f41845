use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use hapetus_domain::auth::AuthenticatedUser;
use hapetus_domain::entities::dto::{DataEnvelope, MessageEnvelope, UpdateUserSettingsDto, UserSettingsDto};

use super::json_body;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Read the caller's settings, defaults if never saved
#[utoipa::path(
    get,
    path = "/api/user/settings",
    responses(
        (status = 200, description = "Settings wrapped in `data`", body = UserSettingsDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "settings"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state.settings.get_settings(&user.user_id).await?;
    Ok(Json(DataEnvelope { data }))
}

/// Update some of the caller's settings
#[utoipa::path(
    put,
    path = "/api/user/settings",
    request_body = UpdateUserSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = MessageEnvelope),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "settings"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateUserSettingsDto>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let update = json_body(payload)?;
    state.settings.update_settings(&user.user_id, update).await?;
    Ok(Json(MessageEnvelope::new("Settings updated")))
}
