//! HTTP implementation of the backend contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::imaging::PreparedImage;
use crate::models::config::ApiConfig;
use crate::models::expense::ExpenseRecord;

use super::{AddExpenseRequest, AddExpenseResponse, ExpenseBackend, ScanPayload};

const ADD_PATH: &str = "expenses/add/";
const LIST_PATH: &str = "expenses/list/";
const SCAN_PATH: &str = "expenses/scan-receipt/";

/// Backend reached over HTTP at a configurable base URL.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpBackend {
    /// Create a client for `base_url` with a request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Decode(format!("invalid base URL {:?}: {}", base_url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Decode(format!("invalid endpoint {}: {}", path, e)))
    }

    fn list_endpoint(&self, user_id: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(LIST_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Decode("base URL cannot have path segments".to_string()))?
            .pop_if_empty()
            .push(user_id)
            .push("");
        Ok(url)
    }
}

/// Decode a response body, turning non-success statuses into backend errors.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("request failed with status {}", status));
        return Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl ExpenseBackend for HttpBackend {
    async fn add_expense(&self, request: &AddExpenseRequest) -> Result<AddExpenseResponse, ApiError> {
        let url = self.endpoint(ADD_PATH)?;
        debug!("POST {}", url);

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_body(status, &body)
    }

    async fn list_expenses(&self, user_id: &str) -> Result<Vec<ExpenseRecord>, ApiError> {
        let url = self.list_endpoint(user_id)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_body(status, &body)
    }

    async fn scan_receipt(&self, image: &PreparedImage) -> Result<ScanPayload, ApiError> {
        let url = self.endpoint(SCAN_PATH)?;
        debug!("POST {} ({} bytes)", url, image.bytes().len());

        let data_url = image.to_data_url();
        let response = self
            .client
            .post(url)
            .json(&ScanRequest { image: &data_url })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match decode_body::<Envelope<ScanPayload>>(status, &body) {
            Ok(envelope) => Ok(envelope.data),
            Err(ApiError::Backend { message, .. }) => {
                warn!("Receipt recognition failed: {}", message);
                Err(ApiError::Recognition(message))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoints() {
        let backend = HttpBackend::new("https://api.example.com/v1", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.endpoint(ADD_PATH).unwrap().as_str(),
            "https://api.example.com/v1/expenses/add/"
        );
        assert_eq!(
            backend.list_endpoint("alice smith").unwrap().as_str(),
            "https://api.example.com/v1/expenses/list/alice%20smith/"
        );

        let trailing = HttpBackend::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            trailing.endpoint(SCAN_PATH).unwrap().as_str(),
            "http://localhost:8000/expenses/scan-receipt/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpBackend::new("not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_decode_error_body() {
        let err = decode_body::<AddExpenseResponse>(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Missing required fields"}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing required fields");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_error() {
        let err = decode_body::<AddExpenseResponse>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_decode_list() {
        let records: Vec<ExpenseRecord> = decode_body(
            StatusCode::OK,
            r#"[{"amount": 10, "category": "Food", "date": "2024-01-02", "description": "Tea"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Tea");
    }
}
