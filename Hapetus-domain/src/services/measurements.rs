use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use hapetus_data::repository::{DailyMeasurementRepositoryTrait, ExerciseMeasurementRepositoryTrait};

use crate::auth::logging::log_access_denied;
use crate::entities::conversions;
use crate::entities::dto::{DailyMeasurementDto, ExerciseMeasurementDto, UpdateDailyMeasurementDto};
use crate::errors::ServiceError;
use crate::services::validation::{validate_daily, validate_exercise};

/// Trait for measurement service operations, scoped to one user
#[async_trait]
pub trait MeasurementServiceTrait: Send + Sync {
    /// All daily measurements of the user, newest first
    async fn list_daily(&self, user_id: &str) -> Result<Vec<DailyMeasurementDto>, ServiceError>;

    async fn create_daily(&self, user_id: &str, dto: DailyMeasurementDto) -> Result<DailyMeasurementDto, ServiceError>;

    /// Apply a partial correction to a daily measurement the user owns
    async fn update_daily(
        &self,
        user_id: &str,
        id: &str,
        update: UpdateDailyMeasurementDto,
    ) -> Result<DailyMeasurementDto, ServiceError>;

    async fn delete_daily(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;

    async fn list_exercise(&self, user_id: &str) -> Result<Vec<ExerciseMeasurementDto>, ServiceError>;

    async fn create_exercise(
        &self,
        user_id: &str,
        dto: ExerciseMeasurementDto,
    ) -> Result<ExerciseMeasurementDto, ServiceError>;

    async fn delete_exercise(&self, user_id: &str, id: &str) -> Result<(), ServiceError>;
}

/// Measurement service backed by a repository
pub struct MeasurementService<R> {
    repository: R,
}

impl<R> MeasurementService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn ensure_owner(owner: &str, user_id: &str, id: &str) -> Result<(), ServiceError> {
    if owner != user_id {
        log_access_denied(user_id, id);
        return Err(ServiceError::Authorization(format!(
            "Measurement {} belongs to another user",
            id
        )));
    }
    Ok(())
}

#[async_trait]
impl<R> MeasurementServiceTrait for MeasurementService<R>
where
    R: DailyMeasurementRepositoryTrait + ExerciseMeasurementRepositoryTrait,
{
    async fn list_daily(&self, user_id: &str) -> Result<Vec<DailyMeasurementDto>, ServiceError> {
        let records = DailyMeasurementRepositoryTrait::list_for_user(&self.repository, user_id).await?;
        debug!("Loaded {} daily measurements for user {}", records.len(), user_id);
        Ok(records.into_iter().map(conversions::convert_to_dto_daily).collect())
    }

    async fn create_daily(&self, user_id: &str, dto: DailyMeasurementDto) -> Result<DailyMeasurementDto, ServiceError> {
        validate_daily(&dto)?;

        let now = Utc::now().timestamp();
        let record = conversions::convert_to_data_daily(&dto, Uuid::new_v4().to_string(), user_id, now);
        let created = DailyMeasurementRepositoryTrait::create(&self.repository, record).await?;
        info!("Created daily measurement {} for user {}", created.id, user_id);

        let mut response = conversions::convert_to_dto_daily(created);
        response.local_id = dto.local_id;
        Ok(response)
    }

    async fn update_daily(
        &self,
        user_id: &str,
        id: &str,
        update: UpdateDailyMeasurementDto,
    ) -> Result<DailyMeasurementDto, ServiceError> {
        let mut record = DailyMeasurementRepositoryTrait::get_by_id(&self.repository, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Measurement {} not found", id)))?;
        ensure_owner(&record.user_id, user_id, id)?;

        if let Some(spo2) = update.spo2 {
            record.spo2 = spo2;
        }
        if let Some(heart_rate) = update.heart_rate {
            record.heart_rate = heart_rate;
        }
        if let Some(systolic) = update.systolic {
            record.systolic = systolic;
        }
        if let Some(diastolic) = update.diastolic {
            record.diastolic = diastolic;
        }
        if let Some(notes) = update.notes {
            record.notes = notes;
        }
        if let Some(measured_at) = update.measured_at {
            record.measured_at = measured_at;
        }
        record.updated_at = Utc::now().timestamp();

        // The merged record must still be a valid measurement
        validate_daily(&conversions::convert_to_dto_daily(record.clone()))?;

        DailyMeasurementRepositoryTrait::update(&self.repository, record.clone()).await?;
        info!("Updated daily measurement {} for user {}", id, user_id);
        Ok(conversions::convert_to_dto_daily(record))
    }

    async fn delete_daily(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        let record = DailyMeasurementRepositoryTrait::get_by_id(&self.repository, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Measurement {} not found", id)))?;
        ensure_owner(&record.user_id, user_id, id)?;

        if !DailyMeasurementRepositoryTrait::delete(&self.repository, id).await? {
            return Err(ServiceError::NotFound(format!("Measurement {} not found", id)));
        }
        info!("Deleted daily measurement {} for user {}", id, user_id);
        Ok(())
    }

    async fn list_exercise(&self, user_id: &str) -> Result<Vec<ExerciseMeasurementDto>, ServiceError> {
        let records = ExerciseMeasurementRepositoryTrait::list_for_user(&self.repository, user_id).await?;
        Ok(records.into_iter().map(conversions::convert_to_dto_exercise).collect())
    }

    async fn create_exercise(
        &self,
        user_id: &str,
        dto: ExerciseMeasurementDto,
    ) -> Result<ExerciseMeasurementDto, ServiceError> {
        validate_exercise(&dto)?;

        let now = Utc::now().timestamp();
        let record = conversions::convert_to_data_exercise(&dto, Uuid::new_v4().to_string(), user_id, now);
        let created = ExerciseMeasurementRepositoryTrait::create(&self.repository, record).await?;
        info!("Created exercise measurement {} for user {}", created.id, user_id);

        let mut response = conversions::convert_to_dto_exercise(created);
        response.local_id = dto.local_id;
        Ok(response)
    }

    async fn delete_exercise(&self, user_id: &str, id: &str) -> Result<(), ServiceError> {
        let record = ExerciseMeasurementRepositoryTrait::get_by_id(&self.repository, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Exercise measurement {} not found", id)))?;
        ensure_owner(&record.user_id, user_id, id)?;

        if !ExerciseMeasurementRepositoryTrait::delete(&self.repository, id).await? {
            return Err(ServiceError::NotFound(format!("Exercise measurement {} not found", id)));
        }
        info!("Deleted exercise measurement {} for user {}", id, user_id);
        Ok(())
    }
}
