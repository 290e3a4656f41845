use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::{AuthError, AuthenticatedUser, TokenVerifier};

const INTROSPECTION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
}

/// Verifies ID tokens against the identity provider's account lookup endpoint
pub struct IntrospectionVerifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl IntrospectionVerifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, AuthError> {
        let url = url.into();
        if url.is_empty() {
            return Err(AuthError::Config("introspection URL is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(INTROSPECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self { client, url, api_key })
    }
}

/// Map a non-success lookup status. Provider-side failures are outages, not
/// bad tokens.
fn rejection_for_status(status: reqwest::StatusCode) -> AuthError {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        error!("Token introspection unavailable: {}", status);
        AuthError::Provider(format!("introspection returned {}", status))
    } else {
        debug!("Token introspection rejected token with status {}", status);
        AuthError::InvalidToken(format!("introspection returned {}", status))
    }
}

/// Extract the user from an account lookup response body
fn parse_lookup(body: &str) -> Result<AuthenticatedUser, AuthError> {
    let response: LookupResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Provider(format!("unreadable lookup response: {}", e)))?;

    let user = response
        .users
        .into_iter()
        .next()
        .ok_or_else(|| AuthError::InvalidToken("no user for token".to_string()))?;

    if user.local_id.is_empty() {
        return Err(AuthError::InvalidToken("lookup returned an empty user id".to_string()));
    }

    Ok(AuthenticatedUser {
        user_id: user.local_id,
        email: user.email,
        auth_source: "introspection".to_string(),
    })
}

#[async_trait]
impl TokenVerifier for IntrospectionVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut request = self.client.post(&self.url).json(&json!({ "idToken": token }));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await.map_err(|e| {
            error!("Token introspection request failed: {}", e);
            AuthError::Provider(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection_for_status(status));
        }

        let body = response.text().await.map_err(|e| AuthError::Provider(e.to_string()))?;
        parse_lookup(&body)
    }

    fn method(&self) -> &'static str {
        "introspection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup_reads_first_user() {
        let body = r#"{"kind":"identitytoolkit#GetAccountInfoResponse","users":[{"localId":"abc123","email":"a@example.com","emailVerified":true}]}"#;
        let user = parse_lookup(body).unwrap();
        assert_eq!(user.user_id, "abc123");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.auth_source, "introspection");
    }

    #[test]
    fn test_parse_lookup_without_users_is_invalid_token() {
        assert!(matches!(parse_lookup(r#"{"users":[]}"#), Err(AuthError::InvalidToken(_))));
        assert!(matches!(parse_lookup("{}"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_parse_lookup_garbage_is_provider_error() {
        assert!(matches!(parse_lookup("<html>"), Err(AuthError::Provider(_))));
    }

    #[test]
    fn test_provider_failures_are_not_token_errors() {
        use reqwest::StatusCode;

        assert!(matches!(rejection_for_status(StatusCode::BAD_GATEWAY), AuthError::Provider(_)));
        assert!(matches!(rejection_for_status(StatusCode::SERVICE_UNAVAILABLE), AuthError::Provider(_)));
        assert!(matches!(rejection_for_status(StatusCode::TOO_MANY_REQUESTS), AuthError::Provider(_)));
        assert!(matches!(rejection_for_status(StatusCode::BAD_REQUEST), AuthError::InvalidToken(_)));
        assert!(matches!(rejection_for_status(StatusCode::UNAUTHORIZED), AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_lookup_outage_is_provider_error() {
        use axum::{http::StatusCode, routing::post, Router};

        let app = Router::new().route("/lookup", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/lookup", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let verifier = IntrospectionVerifier::new(url, None).unwrap();
        assert!(matches!(verifier.verify("some-token").await, Err(AuthError::Provider(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(IntrospectionVerifier::new("", None), Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_token_is_missing() {
        let verifier = IntrospectionVerifier::new("http://127.0.0.1:9/lookup", None).unwrap();
        assert!(matches!(verifier.verify("").await, Err(AuthError::MissingToken)));
    }
}
