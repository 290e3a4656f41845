use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use hapetus_domain::auth::AuthenticatedUser;
use hapetus_domain::entities::dto::DataEnvelope;
use hapetus_domain::entities::stats::{DailyStatsRow, RangeStats};

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Query parameters for per-day statistics
#[derive(Debug, Deserialize, IntoParams)]
pub struct DaysQuery {
    /// Number of days to cover (default 30, at most 365)
    pub days: Option<u32>,
}

/// Query parameters for range statistics
#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Start of the range, Unix seconds
    pub start: i64,
    /// End of the range, Unix seconds, inclusive
    pub end: i64,
}

/// Per-day averages over the last seven days
#[utoipa::path(
    get,
    path = "/api/stats/week",
    responses(
        (status = 200, description = "Per-day rows wrapped in `data`", body = [DailyStatsRow]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "stats"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn week_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state.stats.week(&user.user_id, Utc::now().timestamp()).await?;
    Ok(Json(DataEnvelope { data }))
}

/// Per-day averages over the last `days` days
#[utoipa::path(
    get,
    path = "/api/stats/daily",
    params(DaysQuery),
    responses(
        (status = 200, description = "Per-day rows wrapped in `data`", body = [DailyStatsRow]),
        (status = 400, description = "`days` out of range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "stats"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn daily_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<DaysQuery>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state
        .stats
        .daily(&user.user_id, query.days, Utc::now().timestamp())
        .await?;
    Ok(Json(DataEnvelope { data }))
}

/// Summary and classification over an explicit time range
#[utoipa::path(
    get,
    path = "/api/stats/range",
    params(RangeQuery),
    responses(
        (status = 200, description = "Range summary wrapped in `data`", body = RangeStats),
        (status = 400, description = "Start is after end", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "stats"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn range_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let data = state.stats.range(&user.user_id, query.start, query.end).await?;
    Ok(Json(DataEnvelope { data }))
}
