use hapetus_data::models::{DailyMeasurementRecord, ExerciseMeasurementRecord, UserSettingsRecord};
use tracing::warn;

use crate::entities::dto::{DailyMeasurementDto, ExerciseMeasurementDto, UserSettingsDto};
use crate::entities::settings::Gender;

/// Conversion functions between wire DTOs and storage records.
/// They follow the pattern convert_to_[target_layer]_[model_name].

/// Convert a stored daily measurement into its wire form
pub fn convert_to_dto_daily(record: DailyMeasurementRecord) -> DailyMeasurementDto {
    DailyMeasurementDto {
        id: record.id,
        user_id: record.user_id,
        spo2: record.spo2,
        heart_rate: record.heart_rate,
        systolic: record.systolic,
        diastolic: record.diastolic,
        notes: record.notes,
        measured_at: record.measured_at,
        created_at: record.created_at,
        updated_at: record.updated_at,
        local_id: None,
    }
}

/// Build the storage record for a validated create request
pub fn convert_to_data_daily(
    dto: &DailyMeasurementDto,
    id: String,
    user_id: &str,
    now: i64,
) -> DailyMeasurementRecord {
    DailyMeasurementRecord {
        id,
        user_id: user_id.to_string(),
        spo2: dto.spo2,
        heart_rate: dto.heart_rate,
        systolic: dto.systolic,
        diastolic: dto.diastolic,
        notes: dto.notes.clone(),
        measured_at: dto.measured_at,
        created_at: now,
        updated_at: now,
    }
}

pub fn convert_to_dto_exercise(record: ExerciseMeasurementRecord) -> ExerciseMeasurementDto {
    ExerciseMeasurementDto {
        id: record.id,
        user_id: record.user_id,
        before_spo2: record.before_spo2,
        before_heart_rate: record.before_heart_rate,
        before_systolic: record.before_systolic,
        before_diastolic: record.before_diastolic,
        after_spo2: record.after_spo2,
        after_heart_rate: record.after_heart_rate,
        after_systolic: record.after_systolic,
        after_diastolic: record.after_diastolic,
        exercise_details: record.exercise_details,
        notes: record.notes,
        measured_at: record.measured_at,
        created_at: record.created_at,
        updated_at: record.updated_at,
        local_id: None,
    }
}

pub fn convert_to_data_exercise(
    dto: &ExerciseMeasurementDto,
    id: String,
    user_id: &str,
    now: i64,
) -> ExerciseMeasurementRecord {
    ExerciseMeasurementRecord {
        id,
        user_id: user_id.to_string(),
        before_spo2: dto.before_spo2,
        before_heart_rate: dto.before_heart_rate,
        before_systolic: dto.before_systolic,
        before_diastolic: dto.before_diastolic,
        after_spo2: dto.after_spo2,
        after_heart_rate: dto.after_heart_rate,
        after_systolic: dto.after_systolic,
        after_diastolic: dto.after_diastolic,
        exercise_details: dto.exercise_details.clone(),
        notes: dto.notes.clone(),
        measured_at: dto.measured_at,
        created_at: now,
        updated_at: now,
    }
}

/// Convert stored settings, dropping a gender value that no longer parses
pub fn convert_to_dto_settings(record: UserSettingsRecord) -> UserSettingsDto {
    let gender = record.gender.as_deref().and_then(|g| match g.parse::<Gender>() {
        Ok(gender) => Some(gender),
        Err(e) => {
            warn!("Ignoring stored gender for user {}: {}", record.user_id, e);
            None
        }
    });

    UserSettingsDto {
        user_id: record.user_id,
        birth_year: record.birth_year,
        gender,
        display_name: record.display_name,
        reminders_enabled: record.reminders_enabled,
        updated_at: record.updated_at,
    }
}

pub fn convert_to_data_settings(dto: &UserSettingsDto) -> UserSettingsRecord {
    UserSettingsRecord {
        user_id: dto.user_id.clone(),
        birth_year: dto.birth_year,
        gender: dto.gender.map(|g| g.as_str().to_string()),
        display_name: dto.display_name.clone(),
        reminders_enabled: dto.reminders_enabled,
        updated_at: dto.updated_at,
    }
}
