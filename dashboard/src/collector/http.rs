use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{AnalyticsBackend, Endpoint, SUBMIT_PATH};
use crate::error::{FetchError, SubmissionError};
use crate::model::{SubmitPayload, SubmitReceipt};

const DEFAULT_WRITE_ERROR: &str = "Error saving";

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// reqwest-backed access to the feedback backend.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pull the `message` out of an error body, if the body has one.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or(DEFAULT_WRITE_ERROR)
                .to_string()
        })
}

impl AnalyticsBackend for HttpBackend {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let url = self.url(endpoint.path());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "read endpoint returned an error status");
            return Err(FetchError::Backend {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(format!("{endpoint}: {e}")))
    }

    async fn submit(&self, payload: SubmitPayload) -> Result<SubmitReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.url(SUBMIT_PATH))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| SubmissionError::Malformed(e.to_string()))
        } else {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_WRITE_ERROR.to_string());
            Err(SubmissionError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }
}
