use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use hapetus_domain::entities::dto::{CreatedEnvelope, DataEnvelope};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::record::SyncRecord;
use crate::session::Session;
use crate::store::RemoteStore;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Remote store speaking the Hapetus REST API
pub struct HttpRemoteStore<R> {
    client: Client,
    base_url: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: SyncRecord> HttpRemoteStore<R> {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Share an existing client, e.g. one per app for both record types
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            _record: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.base_url, R::resource())
    }

    fn item_url(&self, server_id: &str) -> String {
        format!("{}/{}", self.collection_url(), server_id)
    }

    async fn send(&self, request: RequestBuilder, session: &Session) -> Result<Response, SyncError> {
        let response = request.bearer_auth(&session.id_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("{} request failed with {}: {}", R::resource(), status, body);
        Err(SyncError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Message of an API error body, or the raw body when it is not one
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|error| error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl<R: SyncRecord> RemoteStore<R> for HttpRemoteStore<R> {
    async fn list(&self, session: &Session) -> Result<Vec<R>, SyncError> {
        let response = self.send(self.client.get(self.collection_url()), session).await?;
        let envelope: DataEnvelope<Vec<R::Wire>> = response.json().await?;
        Ok(envelope.data.into_iter().map(R::from_wire).collect())
    }

    async fn create(&self, session: &Session, record: &R) -> Result<R, SyncError> {
        let request = self.client.post(self.collection_url()).json(&record.to_wire());
        let envelope: CreatedEnvelope<R::Wire> = self.send(request, session).await?.json().await?;
        Ok(R::from_wire(envelope.data))
    }

    async fn update(&self, session: &Session, record: &R) -> Result<(), SyncError> {
        if !R::supports_remote_update() {
            return Err(SyncError::Unsupported("remote update"));
        }
        let server_id = record
            .server_id()
            .ok_or_else(|| SyncError::Local("record was never created on the server".to_string()))?;

        // Optional fields go out as explicit nulls, which the server treats
        // as cleared rather than unchanged
        let request = self.client.put(self.item_url(server_id)).json(&record.to_wire());
        self.send(request, session).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, server_id: &str) -> Result<(), SyncError> {
        self.send(self.client.delete(self.item_url(server_id)), session).await?;
        Ok(())
    }
}
