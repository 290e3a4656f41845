//! Authentication for the Hapetus API
//!
//! Bearer tokens are checked by a [`TokenVerifier`]. Production uses the
//! identity provider's introspection endpoint; development and tests use
//! locally signed HS256 tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod introspection;
pub mod local_jwt;
pub mod logging;

#[cfg(feature = "with-axum")]
pub mod middleware;

pub use introspection::IntrospectionVerifier;
pub use local_jwt::LocalJwtVerifier;

#[cfg(feature = "with-axum")]
pub use middleware::{auth_middleware, configure_auth};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The identity provider could not be reached or answered garbage
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Authentication configuration error: {0}")]
    Config(String),
}

/// The user a request was authenticated as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    /// Verifier that accepted the token
    pub auth_source: String,
}

/// Turns a bearer token into the user it belongs to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Short name used in auth logs
    fn method(&self) -> &'static str;
}
