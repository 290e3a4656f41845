use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::classification::BpCategory;

/// Aggregates for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DailyStatsRow {
    /// Day in `YYYY-MM-DD` form
    pub day: String,
    pub count: usize,
    pub avg_spo2: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    pub avg_systolic: Option<f64>,
    pub avg_diastolic: Option<f64>,
}

/// Summary over an arbitrary time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RangeStats {
    pub start: i64,
    pub end: i64,
    pub count: usize,
    pub avg_spo2: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    pub avg_systolic: Option<f64>,
    pub avg_diastolic: Option<f64>,
    pub min_spo2: Option<i32>,
    pub max_heart_rate: Option<i32>,
    pub min_systolic: Option<i32>,
    pub max_systolic: Option<i32>,
    pub min_diastolic: Option<i32>,
    pub max_diastolic: Option<i32>,
    /// Category of the average blood pressure, for the user's age and gender
    pub category: Option<BpCategory>,
}
