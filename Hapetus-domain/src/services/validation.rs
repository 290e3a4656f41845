use std::ops::RangeInclusive;

use validator::Validate;

use crate::entities::dto::{DailyMeasurementDto, ExerciseMeasurementDto};
use crate::entities::measurement::{ExerciseVitals, Vitals};
use crate::errors::ServiceError;

/// Accepted SpO2 values in percent
pub const SPO2_RANGE: RangeInclusive<i32> = 50..=100;

/// Accepted heart rate values in beats per minute
pub const HEART_RATE_RANGE: RangeInclusive<i32> = 30..=250;

/// Narrower heart rate range shown as an input hint by clients. Advisory only,
/// the server enforces [`HEART_RATE_RANGE`].
pub const HEART_RATE_HINT: RangeInclusive<i32> = 30..=220;

pub const SYSTOLIC_RANGE: RangeInclusive<i32> = 80..=200;

pub const DIASTOLIC_RANGE: RangeInclusive<i32> = 50..=130;

/// Validate a daily measurement and return its typed vitals
pub fn validate_daily(dto: &DailyMeasurementDto) -> Result<Vitals, ServiceError> {
    dto.validate()?;
    validate_timestamp(dto.measured_at)?;
    Ok(Vitals::from_parts(dto.spo2, dto.heart_rate, dto.systolic, dto.diastolic)?)
}

/// Validate an exercise measurement and return the before and after groups
pub fn validate_exercise(dto: &ExerciseMeasurementDto) -> Result<(ExerciseVitals, ExerciseVitals), ServiceError> {
    dto.validate()?;
    validate_timestamp(dto.measured_at)?;

    if dto.exercise_details.trim().is_empty() {
        return Err(ServiceError::Validation(
            "exercise_details: Exercise details are required".to_string(),
        ));
    }

    let before = ExerciseVitals::from_parts(
        dto.before_spo2,
        dto.before_heart_rate,
        dto.before_systolic,
        dto.before_diastolic,
    )
    .map_err(|e| ServiceError::Validation(format!("before: {}", e)))?;

    let after = ExerciseVitals::from_parts(
        dto.after_spo2,
        dto.after_heart_rate,
        dto.after_systolic,
        dto.after_diastolic,
    )
    .map_err(|e| ServiceError::Validation(format!("after: {}", e)))?;

    Ok((before, after))
}

fn validate_timestamp(measured_at: i64) -> Result<(), ServiceError> {
    if measured_at <= 0 {
        return Err(ServiceError::Validation(
            "measured_at: Timestamp must be a positive Unix time".to_string(),
        ));
    }
    Ok(())
}
