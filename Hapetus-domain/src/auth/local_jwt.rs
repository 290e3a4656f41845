use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthError, AuthenticatedUser, TokenVerifier};

/// Claims carried by locally issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalClaims {
    /// Subject (user ID)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// HS256 verifier for development and tests
pub struct LocalJwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl LocalJwtVerifier {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Config("JWT secret is empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        })
    }

    /// Sign a token for `user_id` valid for `ttl`
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = LocalClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            email: None,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Config(format!("failed to sign token: {}", e)))
    }
}

#[async_trait]
impl TokenVerifier for LocalJwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<LocalClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Local token rejected: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token has expired".to_string()),
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }

        Ok(AuthenticatedUser {
            user_id: data.claims.sub,
            email: data.claims.email,
            auth_source: "local-jwt".to_string(),
        })
    }

    fn method(&self) -> &'static str {
        "local-jwt"
    }
}
