use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Bearer token checked by a verifier
    TokenValidation,
    /// Authenticated user touched a record they do not own
    AccessDenied,
    /// The identity provider could not be reached
    ProviderUnavailable,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
            AuthEventType::ProviderUnavailable => write!(f, "PROVIDER_UNAVAILABLE"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID (if known)
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path or record being accessed
    pub resource: Option<String>,
    pub duration_ms: Option<u64>,
    /// Verifier that handled the token ("introspection", "local-jwt")
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event; failures go out at warn level
pub fn log_auth_event(event: AuthEvent) {
    let user_id = event.user_id.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [SUCCESS] [{}] [{}] {}",
            event.event_type, user_id, method, resource, details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [FAILURE] [{}] [{}] {}",
            event.event_type, user_id, method, resource, details
        );
    }
}

/// Log an attempt to touch another user's record
pub fn log_access_denied(user_id: &str, resource: &str) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
        .with_resource(resource)
        .with_details("Record belongs to another user");

    log_auth_event(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_event() {
        let event = AuthEvent::new(AuthEventType::TokenValidation, Some("user123"), true)
            .with_details("Token accepted")
            .with_resource("/api/daily")
            .with_duration(12)
            .with_auth_method("local-jwt");

        assert_eq!(event.event_type, AuthEventType::TokenValidation);
        assert_eq!(event.user_id, Some("user123".to_string()));
        assert!(event.success);
        assert_eq!(event.resource, Some("/api/daily".to_string()));
        assert_eq!(event.duration_ms, Some(12));
        assert_eq!(event.auth_method, Some("local-jwt".to_string()));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(AuthEventType::TokenValidation.to_string(), "TOKEN_VALIDATION");
        assert_eq!(AuthEventType::AccessDenied.to_string(), "ACCESS_DENIED");
    }
}
