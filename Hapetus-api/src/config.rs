use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use hapetus_domain::auth::{IntrospectionVerifier, LocalJwtVerifier, TokenVerifier};

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Authentication setup failed: {0}")]
    Auth(String),
}

/// How bearer tokens are verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Ask the identity provider about every token
    Introspection { url: String, api_key: Option<String> },
    /// HS256 tokens signed with a shared secret
    Local { secret: String },
}

/// Server configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub auth: AuthMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: value.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let mode = lookup("AUTH_MODE").unwrap_or_else(|| "introspection".to_string());
        let auth = match mode.to_lowercase().as_str() {
            "introspection" => AuthMode::Introspection {
                url: lookup("AUTH_INTROSPECTION_URL").ok_or(ConfigError::Missing("AUTH_INTROSPECTION_URL"))?,
                api_key: lookup("AUTH_API_KEY").filter(|key| !key.is_empty()),
            },
            "local" => AuthMode::Local {
                secret: lookup("AUTH_JWT_SECRET").ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?,
            },
            _ => {
                return Err(ConfigError::InvalidValue {
                    name: "AUTH_MODE",
                    value: mode,
                })
            }
        };

        Ok(Self { port, environment, auth })
    }

    /// Construct the token verifier selected by `AUTH_MODE`
    pub fn token_verifier(&self) -> Result<Arc<dyn TokenVerifier>, ConfigError> {
        match &self.auth {
            AuthMode::Introspection { url, api_key } => {
                info!("Verifying tokens through introspection at {}", url);
                let verifier = IntrospectionVerifier::new(url.clone(), api_key.clone())
                    .map_err(|e| ConfigError::Auth(e.to_string()))?;
                Ok(Arc::new(verifier))
            }
            AuthMode::Local { secret } => {
                if self.environment == "production" {
                    warn!("Local JWT verification is enabled in production");
                }
                let verifier = LocalJwtVerifier::new(secret).map_err(|e| ConfigError::Auth(e.to_string()))?;
                Ok(Arc::new(verifier))
            }
        }
    }
}
