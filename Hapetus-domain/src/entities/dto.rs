//! Wire-format DTOs shared by the API server and the sync client.
//!
//! Field names are snake_case and every timestamp is Unix seconds.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::classification::Classification;
use crate::entities::settings::Gender;

/// A daily measurement as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DailyMeasurementDto {
    /// Server-assigned identifier, empty on create
    #[serde(default)]
    pub id: String,

    /// Owner, filled in by the server
    #[serde(default)]
    pub user_id: String,

    /// Blood oxygen saturation in percent
    #[validate(range(min = 50, max = 100, message = "SpO2 must be between 50 and 100"))]
    pub spo2: Option<i32>,

    /// Heart rate in beats per minute
    #[validate(range(min = 30, max = 250, message = "Heart rate must be between 30 and 250"))]
    pub heart_rate: Option<i32>,

    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 80, max = 200, message = "Systolic must be between 80 and 200"))]
    pub systolic: Option<i32>,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 50, max = 130, message = "Diastolic must be between 50 and 130"))]
    pub diastolic: Option<i32>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the measurement was taken
    pub measured_at: i64,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,

    /// Client correlation hint, echoed back on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
}

/// Partial update of a daily measurement.
///
/// An absent field keeps its stored value and an explicit `null` clears it.
/// Bounds are checked on the merged record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateDailyMeasurementDto {
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<i32>))]
    pub spo2: Option<Option<i32>>,

    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<i32>))]
    pub heart_rate: Option<Option<i32>>,

    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<i32>))]
    pub systolic: Option<Option<i32>>,

    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<i32>))]
    pub diastolic: Option<Option<i32>>,

    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub notes: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<i64>,
}

/// Absent stays `None` through `#[serde(default)]`; a present value,
/// `null` included, becomes `Some`
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An exercise measurement (before and after readings) as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ExerciseMeasurementDto {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub user_id: String,

    #[validate(range(min = 50, max = 100, message = "Before SpO2 must be between 50 and 100"))]
    pub before_spo2: i32,

    #[validate(range(min = 30, max = 250, message = "Before heart rate must be between 30 and 250"))]
    pub before_heart_rate: i32,

    #[validate(range(min = 80, max = 200, message = "Before systolic must be between 80 and 200"))]
    pub before_systolic: Option<i32>,

    #[validate(range(min = 50, max = 130, message = "Before diastolic must be between 50 and 130"))]
    pub before_diastolic: Option<i32>,

    #[validate(range(min = 50, max = 100, message = "After SpO2 must be between 50 and 100"))]
    pub after_spo2: i32,

    #[validate(range(min = 30, max = 250, message = "After heart rate must be between 30 and 250"))]
    pub after_heart_rate: i32,

    #[validate(range(min = 80, max = 200, message = "After systolic must be between 80 and 200"))]
    pub after_systolic: Option<i32>,

    #[validate(range(min = 50, max = 130, message = "After diastolic must be between 50 and 130"))]
    pub after_diastolic: Option<i32>,

    /// What the user did between the two readings
    #[validate(length(max = 500, message = "Exercise details cannot exceed 500 characters"))]
    pub exercise_details: String,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub measured_at: i64,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
}

/// Per-user settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserSettingsDto {
    #[serde(default)]
    pub user_id: String,
    pub birth_year: Option<i32>,
    pub gender: Option<Gender>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub reminders_enabled: bool,
    #[serde(default)]
    pub updated_at: i64,
}

/// Partial settings update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateUserSettingsDto {
    #[validate(range(min = 1900, max = 2100, message = "Birth year must be between 1900 and 2100"))]
    pub birth_year: Option<i32>,

    pub gender: Option<Gender>,

    #[validate(length(max = 100, message = "Display name cannot exceed 100 characters"))]
    pub display_name: Option<String>,

    pub reminders_enabled: Option<bool>,
}

/// Ad-hoc classification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ClassifyRequest {
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: i32,

    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: i32,

    #[validate(range(min = 0, max = 130, message = "Age must be between 0 and 130"))]
    pub age: Option<i32>,

    pub gender: Option<Gender>,
}

/// Classification plus the matching advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ClassificationResponse {
    #[serde(flatten)]
    pub classification: Classification,
    pub recommendations: Vec<String>,
}

/// `{ "data": ... }` envelope used by list and read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{ "message": ..., "data": ... }` envelope returned on create
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEnvelope<T> {
    pub message: String,
    pub data: T,
}

/// `{ "message": ... }` envelope returned by update and delete
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MessageEnvelope {
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
