use crate::error::AppError;
use crate::model::ConversationMessage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Chat-completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ConversationMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Raw HTTP outcome; the bridge decides what the status means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Performs one authenticated POST. Only transport-level failures
    /// (connection, TLS, body read) are errors here.
    async fn send(
        &self,
        request: &CompletionRequest,
        credential: &SecretString,
    ) -> Result<CompletionResponse, AppError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new<E: Into<String>>(endpoint: E) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        request: &CompletionRequest,
        credential: &SecretString,
    ) -> Result<CompletionResponse, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|err| AppError::service(None, err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::service(Some(status), err.to_string()))?;

        Ok(CompletionResponse { status, body })
    }
}
