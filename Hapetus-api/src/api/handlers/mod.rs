pub mod classify;
pub mod daily;
pub mod exercise;
pub mod health;
pub mod settings;
pub mod stats;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use tracing::debug;

use crate::entities::common::ErrorResponse;

/// Turn a body rejection into the standard 400 response
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ErrorResponse> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            Err(ErrorResponse::bad_request(rejection.body_text()))
        }
    }
}

pub use classify::{classify_reading, list_guidelines};
pub use daily::{create_daily, delete_daily, list_daily, update_daily};
pub use exercise::{create_exercise, delete_exercise, list_exercise};
pub use health::health_check;
pub use settings::{get_settings, update_settings};
pub use stats::{range_stats, daily_stats, week_stats};
