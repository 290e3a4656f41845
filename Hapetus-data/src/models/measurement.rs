use serde::{Deserialize, Serialize};

/// Storage model for a daily measurement row
///
/// Timestamps are Unix seconds, matching the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMeasurementRecord {
    /// Server-assigned identifier
    pub id: String,

    /// Owner of the record
    pub user_id: String,

    /// Blood oxygen saturation in percent
    pub spo2: Option<i32>,

    /// Heart rate in beats per minute
    pub heart_rate: Option<i32>,

    /// Systolic blood pressure in mmHg
    pub systolic: Option<i32>,

    /// Diastolic blood pressure in mmHg
    pub diastolic: Option<i32>,

    /// Free-text notes
    pub notes: Option<String>,

    /// When the measurement was taken
    pub measured_at: i64,

    pub created_at: i64,

    pub updated_at: i64,
}

/// Storage model for an exercise measurement row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseMeasurementRecord {
    pub id: String,
    pub user_id: String,
    pub before_spo2: i32,
    pub before_heart_rate: i32,
    pub before_systolic: Option<i32>,
    pub before_diastolic: Option<i32>,
    pub after_spo2: i32,
    pub after_heart_rate: i32,
    pub after_systolic: Option<i32>,
    pub after_diastolic: Option<i32>,
    /// What the user did between the two readings
    pub exercise_details: String,
    pub notes: Option<String>,
    pub measured_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Storage model for per-user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettingsRecord {
    pub user_id: String,

    /// Year of birth, used to pick blood pressure guidelines
    pub birth_year: Option<i32>,

    /// Stored as "male", "female" or "other"
    pub gender: Option<String>,

    pub display_name: Option<String>,

    pub reminders_enabled: bool,

    pub updated_at: i64,
}
