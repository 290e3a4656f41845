use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tracing::debug;

use hapetus_data::repository::{DailyMeasurementRepositoryTrait, UserSettingsRepositoryTrait};

use crate::entities::classification::BpCategory;
use crate::entities::conversions;
use crate::entities::dto::DailyMeasurementDto;
use crate::entities::settings::Gender;
use crate::entities::stats::{DailyStatsRow, RangeStats};
use crate::errors::ServiceError;
use crate::services::classifier::{classify, current_age};

pub const DEFAULT_STATS_DAYS: u32 = 30;
pub const MAX_STATS_DAYS: u32 = 365;

const SECONDS_PER_DAY: i64 = 86_400;

#[async_trait]
pub trait StatsServiceTrait: Send + Sync {
    /// Per-day rows for the seven days ending at `now`
    async fn week(&self, user_id: &str, now: i64) -> Result<Vec<DailyStatsRow>, ServiceError>;

    /// Per-day rows for the last `days` days (default 30, at most 365)
    async fn daily(&self, user_id: &str, days: Option<u32>, now: i64) -> Result<Vec<DailyStatsRow>, ServiceError>;

    /// Summary over `[start, end]`, both inclusive
    async fn range(&self, user_id: &str, start: i64, end: i64) -> Result<RangeStats, ServiceError>;
}

pub struct StatsService<R> {
    repository: R,
}

impl<R> StatsService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R> StatsService<R>
where
    R: DailyMeasurementRepositoryTrait + UserSettingsRepositoryTrait,
{
    async fn load(&self, user_id: &str, start: i64, end: i64) -> Result<Vec<DailyMeasurementDto>, ServiceError> {
        let records = self.repository.list_for_user_between(user_id, start, end).await?;
        debug!("Aggregating {} measurements for user {}", records.len(), user_id);
        Ok(records.into_iter().map(conversions::convert_to_dto_daily).collect())
    }
}

#[async_trait]
impl<R> StatsServiceTrait for StatsService<R>
where
    R: DailyMeasurementRepositoryTrait + UserSettingsRepositoryTrait,
{
    async fn week(&self, user_id: &str, now: i64) -> Result<Vec<DailyStatsRow>, ServiceError> {
        self.daily(user_id, Some(7), now).await
    }

    async fn daily(&self, user_id: &str, days: Option<u32>, now: i64) -> Result<Vec<DailyStatsRow>, ServiceError> {
        let days = days.unwrap_or(DEFAULT_STATS_DAYS);
        if days == 0 || days > MAX_STATS_DAYS {
            return Err(ServiceError::Validation(format!(
                "days: Must be between 1 and {}",
                MAX_STATS_DAYS
            )));
        }

        let start = window_start(now, days);
        let records = self.load(user_id, start, now).await?;
        Ok(aggregate_by_day(&records))
    }

    async fn range(&self, user_id: &str, start: i64, end: i64) -> Result<RangeStats, ServiceError> {
        if start > end {
            return Err(ServiceError::Validation(
                "start: Range start must not be after its end".to_string(),
            ));
        }

        let records = self.load(user_id, start, end).await?;
        let settings = self.repository.get(user_id).await?.map(conversions::convert_to_dto_settings);
        let age = settings.as_ref().and_then(|s| s.birth_year).map(current_age);
        let gender = settings.and_then(|s| s.gender);

        Ok(summarize(&records, start, end, age, gender))
    }
}

/// Midnight (UTC) of the first day of a `days`-long window ending at `now`
fn window_start(now: i64, days: u32) -> i64 {
    let today = now - now.rem_euclid(SECONDS_PER_DAY);
    today - (days as i64 - 1) * SECONDS_PER_DAY
}

fn day_of(timestamp: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(timestamp, 0).single().map(|dt| dt.date_naive())
}

fn mean(values: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0usize), |(sum, count), v| (sum + v as i64, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

/// Group measurements by UTC calendar day, oldest day first
pub fn aggregate_by_day(records: &[DailyMeasurementDto]) -> Vec<DailyStatsRow> {
    let mut days: BTreeMap<NaiveDate, Vec<&DailyMeasurementDto>> = BTreeMap::new();
    for record in records {
        if let Some(day) = day_of(record.measured_at) {
            days.entry(day).or_default().push(record);
        }
    }

    days.into_iter()
        .map(|(day, records)| DailyStatsRow {
            day: day.format("%Y-%m-%d").to_string(),
            count: records.len(),
            avg_spo2: mean(records.iter().filter_map(|r| r.spo2)),
            avg_heart_rate: mean(records.iter().filter_map(|r| r.heart_rate)),
            avg_systolic: mean(records.iter().filter_map(|r| r.systolic)),
            avg_diastolic: mean(records.iter().filter_map(|r| r.diastolic)),
        })
        .collect()
}

/// Summarise measurements over a range and classify the average pressure
pub fn summarize(
    records: &[DailyMeasurementDto],
    start: i64,
    end: i64,
    age: Option<i32>,
    gender: Option<Gender>,
) -> RangeStats {
    let avg_systolic = mean(records.iter().filter_map(|r| r.systolic));
    let avg_diastolic = mean(records.iter().filter_map(|r| r.diastolic));

    let category: Option<BpCategory> = match (avg_systolic, avg_diastolic) {
        (Some(sys), Some(dia)) => Some(classify(sys.round() as i32, dia.round() as i32, age, gender).category),
        _ => None,
    };

    RangeStats {
        start,
        end,
        count: records.len(),
        avg_spo2: mean(records.iter().filter_map(|r| r.spo2)),
        avg_heart_rate: mean(records.iter().filter_map(|r| r.heart_rate)),
        avg_systolic,
        avg_diastolic,
        min_spo2: records.iter().filter_map(|r| r.spo2).min(),
        max_heart_rate: records.iter().filter_map(|r| r.heart_rate).max(),
        min_systolic: records.iter().filter_map(|r| r.systolic).min(),
        max_systolic: records.iter().filter_map(|r| r.systolic).max(),
        min_diastolic: records.iter().filter_map(|r| r.diastolic).min(),
        max_diastolic: records.iter().filter_map(|r| r.diastolic).max(),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::measurements::{MeasurementService, MeasurementServiceTrait};
    use crate::services::settings::{SettingsService, SettingsServiceTrait};
    use crate::entities::dto::UpdateUserSettingsDto;
    use hapetus_data::repository::MeasurementRepository;

    // 2023-11-14T22:13:20Z
    const NOW: i64 = 1_700_000_000;

    fn reading(measured_at: i64, spo2: Option<i32>, systolic: Option<i32>, diastolic: Option<i32>) -> DailyMeasurementDto {
        DailyMeasurementDto {
            id: String::new(),
            user_id: String::new(),
            spo2,
            heart_rate: spo2.map(|_| 70),
            systolic,
            diastolic,
            notes: None,
            measured_at,
            created_at: 0,
            updated_at: 0,
            local_id: None,
        }
    }

    #[test]
    fn test_aggregate_by_day_groups_and_averages() {
        let records = vec![
            reading(NOW, Some(96), Some(120), Some(80)),
            reading(NOW - 60, Some(98), Some(130), Some(84)),
            reading(NOW - SECONDS_PER_DAY, None, Some(140), Some(90)),
        ];

        let rows = aggregate_by_day(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, "2023-11-13");
        assert_eq!(rows[0].avg_spo2, None);
        assert_eq!(rows[1].day, "2023-11-14");
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].avg_spo2, Some(97.0));
        assert_eq!(rows[1].avg_systolic, Some(125.0));
        assert_eq!(rows[1].avg_diastolic, Some(82.0));
    }

    #[test]
    fn test_summarize_classifies_average() {
        let records = vec![
            reading(NOW, Some(95), Some(150), Some(96)),
            reading(NOW, Some(97), Some(140), Some(92)),
        ];

        let stats = summarize(&records, 0, NOW, Some(45), None);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg_systolic, Some(145.0));
        assert_eq!(stats.min_systolic, Some(140));
        assert_eq!(stats.max_diastolic, Some(96));
        assert_eq!(stats.min_spo2, Some(95));
        assert_eq!(stats.category, Some(BpCategory::HypertensionGrade1));
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize(&[], 0, NOW, None, None);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg_spo2, None);
        assert_eq!(stats.category, None);
    }

    #[test]
    fn test_window_start_is_midnight() {
        assert_eq!(window_start(NOW, 1), NOW - NOW % SECONDS_PER_DAY);
        assert_eq!(window_start(NOW, 7), NOW - NOW % SECONDS_PER_DAY - 6 * SECONDS_PER_DAY);
    }

    #[tokio::test]
    async fn test_week_over_seeded_measurements() {
        let repository = MeasurementRepository::in_memory();
        let measurements = MeasurementService::new(repository.clone());
        for offset in [0, 1, 1, 8] {
            measurements
                .create_daily("user-1", reading(NOW - offset * SECONDS_PER_DAY, Some(96), Some(120), Some(80)))
                .await
                .unwrap();
        }

        let stats = StatsService::new(repository);
        let rows = stats.week("user-1", NOW).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 3);

        let rows = stats.daily("user-1", None, NOW).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_days_out_of_bounds() {
        let stats = StatsService::new(MeasurementRepository::in_memory());
        assert!(matches!(stats.daily("user-1", Some(0), NOW).await, Err(ServiceError::Validation(_))));
        assert!(matches!(stats.daily("user-1", Some(366), NOW).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_range_uses_user_profile() {
        let repository = MeasurementRepository::in_memory();
        MeasurementService::new(repository.clone())
            .create_daily("user-1", reading(NOW, None, Some(145), Some(86)))
            .await
            .unwrap();
        SettingsService::new(repository.clone())
            .update_settings(
                "user-1",
                UpdateUserSettingsDto {
                    birth_year: Some(1955),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stats = StatsService::new(repository).range("user-1", NOW - 10, NOW).await.unwrap();
        // 145/86 is high-normal for an older adult
        assert_eq!(stats.category, Some(BpCategory::HighNormal));
    }

    #[tokio::test]
    async fn test_range_rejects_inverted_bounds() {
        let stats = StatsService::new(MeasurementRepository::in_memory());
        assert!(matches!(stats.range("user-1", 10, 5).await, Err(ServiceError::Validation(_))));
    }
}
