//! # api-adapters
//!
//! HTTP client for the forum's search API.
//!
//! | Endpoint                       | Response body                          |
//! |--------------------------------|----------------------------------------|
//! | `GET /search?q&sort&limit&category` | `{success?, data, total?, message?}` |
//! | `GET /search/suggestions?q`    | `{suggestions: [...]}`                 |
//!
//! Every request carries the configured timeout; nothing is retried here.

use std::time::Duration;

use async_trait::async_trait;
use domains::{DomainError, RemoteSearch, RemoteSearchPage, RemoteSearchRequest, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest response body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default = "succeeded")]
    success: bool,
    #[serde(flatten)]
    page: RemoteSearchPage,
}

fn succeeded() -> bool {
    true
}

#[derive(Deserialize)]
struct SuggestionsEnvelope {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRemoteSearch {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRemoteSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DomainError::Config(format!(
                "search base url must be http(s): {base_url:?}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DomainError::Config(format!("building http client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, token: Option<SecretString>) -> RequestBuilder {
        let request = self.client.get(format!("{}{path}", self.base_url));
        match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "search api rejected request");
        Err(status_error(status, &body))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> DomainError {
        if err.is_timeout() {
            DomainError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            DomainError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl RemoteSearch for HttpRemoteSearch {
    async fn search(&self, request: &RemoteSearchRequest, token: Option<SecretString>) -> Result<RemoteSearchPage> {
        let response = self.send(self.get("/search", token).query(request)).await?;
        let envelope: SearchEnvelope = self.decode(response).await?;

        if !envelope.success {
            return Err(DomainError::Remote {
                status: StatusCode::OK.as_u16(),
                message: envelope
                    .page
                    .message
                    .unwrap_or_else(|| "search reported failure".to_string()),
            });
        }

        debug!(q = %request.q, results = envelope.page.data.len(), "remote search answered");
        Ok(envelope.page)
    }

    async fn suggestions(&self, query: &str, token: Option<SecretString>) -> Result<Vec<String>> {
        let response = self
            .send(self.get("/search/suggestions", token).query(&[("q", query)]))
            .await?;
        let envelope: SuggestionsEnvelope = self.decode(response).await?;
        Ok(envelope.suggestions)
    }
}

/// Maps a non-2xx response to the port error.
fn status_error(status: StatusCode, body: &str) -> DomainError {
    let message = truncate(body.trim(), MAX_ERROR_BODY);
    match status {
        StatusCode::UNAUTHORIZED => DomainError::Unauthorized(message),
        _ => DomainError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
