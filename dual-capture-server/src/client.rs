use std::time::Duration;

use reqwest::StatusCode;

use dual_capture_core::{CaptureError, CaptureRecord, CaptureStore, NewCapture};

use crate::routes::{ErrorBody, CAPTURES_PATH};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `CaptureStore` backed by a remote `/api/captures` service.
#[derive(Debug, Clone)]
pub struct HttpCaptureStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCaptureStore {
    /// `base_url` is the service origin, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CaptureError::ConfigurationFailed(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn captures_url(&self) -> String {
        format!("{}{}", self.base_url, CAPTURES_PATH)
    }
}

fn transport_error(error: reqwest::Error) -> CaptureError {
    if error.is_timeout() {
        CaptureError::Timeout
    } else {
        CaptureError::PersistenceFailed(error.to_string())
    }
}

async fn unexpected_status(response: reqwest::Response) -> CaptureError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown status").to_string(),
    };
    CaptureError::PersistenceFailed(format!("{}: {}", status.as_u16(), message))
}

impl CaptureStore for HttpCaptureStore {
    async fn list(&self) -> Result<Vec<CaptureRecord>, CaptureError> {
        let response = self.client.get(self.captures_url()).send().await.map_err(transport_error)?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(response).await);
        }
        response.json().await.map_err(transport_error)
    }

    async fn get(&self, id: i64) -> Result<Option<CaptureRecord>, CaptureError> {
        let url = format!("{}/{}", self.captures_url(), id);
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        match response.status() {
            StatusCode::OK => response.json().await.map(Some).map_err(transport_error),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected_status(response).await),
        }
    }

    async fn create(&self, capture: NewCapture) -> Result<CaptureRecord, CaptureError> {
        capture.validate()?;

        let response = self
            .client
            .post(self.captures_url())
            .json(&capture)
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            StatusCode::CREATED => response.json().await.map_err(transport_error),
            StatusCode::BAD_REQUEST => {
                let body: ErrorBody = response.json().await.map_err(transport_error)?;
                log::warn!("Capture rejected by server: {}", body.message);
                Err(CaptureError::Validation {
                    message: body.message,
                    field: body.field,
                })
            }
            _ => Err(unexpected_status(response).await),
        }
    }
}
