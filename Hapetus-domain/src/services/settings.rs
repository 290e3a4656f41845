use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use validator::Validate;

use hapetus_data::repository::UserSettingsRepositoryTrait;

use crate::entities::conversions;
use crate::entities::dto::{UpdateUserSettingsDto, UserSettingsDto};
use crate::entities::settings::Gender;
use crate::errors::ServiceError;
use crate::services::classifier::current_age;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    /// Settings of the user, defaults when none were saved yet
    async fn get_settings(&self, user_id: &str) -> Result<UserSettingsDto, ServiceError>;

    async fn update_settings(
        &self,
        user_id: &str,
        update: UpdateUserSettingsDto,
    ) -> Result<UserSettingsDto, ServiceError>;

    /// Age and gender used to personalise classification
    async fn profile(&self, user_id: &str) -> Result<(Option<i32>, Option<Gender>), ServiceError> {
        let settings = self.get_settings(user_id).await?;
        Ok((settings.birth_year.map(current_age), settings.gender))
    }
}

pub struct SettingsService<R> {
    repository: R,
}

impl<R> SettingsService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: UserSettingsRepositoryTrait> SettingsServiceTrait for SettingsService<R> {
    async fn get_settings(&self, user_id: &str) -> Result<UserSettingsDto, ServiceError> {
        let settings = match self.repository.get(user_id).await? {
            Some(record) => conversions::convert_to_dto_settings(record),
            None => UserSettingsDto {
                user_id: user_id.to_string(),
                ..Default::default()
            },
        };
        Ok(settings)
    }

    async fn update_settings(
        &self,
        user_id: &str,
        update: UpdateUserSettingsDto,
    ) -> Result<UserSettingsDto, ServiceError> {
        update.validate()?;

        let mut settings = self.get_settings(user_id).await?;
        if update.birth_year.is_some() {
            settings.birth_year = update.birth_year;
        }
        if update.gender.is_some() {
            settings.gender = update.gender;
        }
        if update.display_name.is_some() {
            settings.display_name = update.display_name;
        }
        if let Some(enabled) = update.reminders_enabled {
            settings.reminders_enabled = enabled;
        }
        settings.updated_at = Utc::now().timestamp();

        let saved = self
            .repository
            .upsert(conversions::convert_to_data_settings(&settings))
            .await?;
        info!("Updated settings for user {}", user_id);
        Ok(conversions::convert_to_dto_settings(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hapetus_data::repository::MeasurementRepository;

    #[tokio::test]
    async fn test_defaults_when_nothing_saved() {
        let service = SettingsService::new(MeasurementRepository::in_memory());
        let settings = service.get_settings("user-1").await.unwrap();
        assert_eq!(settings.user_id, "user-1");
        assert_eq!(settings.birth_year, None);
        assert!(!settings.reminders_enabled);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let service = SettingsService::new(MeasurementRepository::in_memory());
        service
            .update_settings(
                "user-1",
                UpdateUserSettingsDto {
                    birth_year: Some(1960),
                    gender: Some(Gender::Male),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let settings = service
            .update_settings(
                "user-1",
                UpdateUserSettingsDto {
                    reminders_enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(settings.birth_year, Some(1960));
        assert_eq!(settings.gender, Some(Gender::Male));
        assert!(settings.reminders_enabled);

        let (age, gender) = service.profile("user-1").await.unwrap();
        assert!(age.unwrap() >= 66);
        assert_eq!(gender, Some(Gender::Male));
    }

    #[tokio::test]
    async fn test_invalid_birth_year_rejected() {
        let service = SettingsService::new(MeasurementRepository::in_memory());
        let result = service
            .update_settings(
                "user-1",
                UpdateUserSettingsDto {
                    birth_year: Some(1500),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
