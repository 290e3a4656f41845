use thiserror::Error;
use validator::ValidationErrors;

use crate::entities::measurement::VitalsError;

/// Errors surfaced by domain services, one variant per HTTP outcome
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    /// Missing or invalid credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The record exists but belongs to someone else
    #[error("Access denied: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        // Field order in ValidationErrors is a HashMap order; sort for stable messages
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();

        ServiceError::Validation(fields.join("; "))
    }
}

impl From<VitalsError> for ServiceError {
    fn from(err: VitalsError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

#[cfg(feature = "with-data")]
impl From<hapetus_data::repository::RepositoryError> for ServiceError {
    fn from(err: hapetus_data::repository::RepositoryError) -> Self {
        use hapetus_data::repository::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::dto::UpdateUserSettingsDto;
    use validator::Validate;

    #[test]
    fn test_validation_errors_keep_custom_messages() {
        let request = UpdateUserSettingsDto {
            birth_year: Some(1800),
            ..Default::default()
        };
        let err: ServiceError = request.validate().unwrap_err().into();
        assert_eq!(
            err,
            ServiceError::Validation("birth_year: Birth year must be between 1900 and 2100".to_string())
        );
    }

    #[test]
    fn test_vitals_error_is_validation() {
        let err: ServiceError = VitalsError::Empty.into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
