//! HTTP client for the open-data API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use camara_core::ApiConfig;

use crate::error::{ApiError, ApiResult};
use crate::source::DataSource;

/// reqwest-backed [`DataSource`].
#[derive(Clone)]
pub struct CamaraClient {
    client: reqwest::Client,
}

impl CamaraClient {
    /// Create a client from API settings.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DataSource for CamaraClient {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> ApiResult<Option<Value>> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url, "Resource not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::decode(url, e))?;

        debug!(url, "Fetched resource");
        Ok(Some(body))
    }
}
