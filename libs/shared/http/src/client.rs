use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::ApiError;

/// Outcome marker of the platform's response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Fail,
    Error,
}

/// The one documented response shape: `{status, message?, code?, data?}`.
///
/// Responses are decoded against this and nothing else. A payload that does
/// not fit is a contract violation, not something to guess around.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: ApiStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
        }
    }

    /// Build a client against an explicit base URL. Used by tests that point
    /// at a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, session: Option<&Session>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(session) = session {
            let value = HeaderValue::from_str(&format!("Bearer {}", session.bearer()))
                .map_err(|_| ApiError::Auth("token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Perform a request and decode the success envelope's `data` as `T`.
    ///
    /// No retries, no caching: a failed call is surfaced as-is and the caller
    /// decides whether to re-fetch.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.headers(session)?;

        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            return Err(Self::classify_failure(status, &text));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Contract(format!("malformed response envelope: {}", e)))?;

        match envelope.status {
            ApiStatus::Success => envelope.data.ok_or_else(|| {
                ApiError::Contract("success response is missing the data field".to_string())
            }),
            ApiStatus::Fail | ApiStatus::Error => Err(ApiError::Rejected {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            }),
        }
    }

    fn classify_failure(status: StatusCode, body: &str) -> ApiError {
        // The error body should itself be an envelope; fall back to the raw
        // text when it is not, so nothing the server said gets lost.
        let (code, message) = match serde_json::from_str::<Envelope<Value>>(body) {
            Ok(envelope) => (
                envelope.code,
                envelope.message.unwrap_or_else(|| body.to_string()),
            ),
            Err(_) => (None, body.to_string()),
        };

        error!("API error ({}): {}", status, message);

        match status.as_u16() {
            401 | 403 => ApiError::Auth(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict { code, message },
            400..=499 => ApiError::Rejected { code, message },
            _ => ApiError::Server(message),
        }
    }
}
