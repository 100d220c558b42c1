//! The fetch seam between the pipeline and the upstream API.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

/// Query string parameters, in request order.
pub type QueryParams = Vec<(String, String)>;

/// Something that answers GET requests with JSON bodies.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch `url` with `params` appended to its query string.
    ///
    /// Returns `Ok(None)` on 404, which callers treat as "no data".
    /// Any other non-2xx status is an error.
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> ApiResult<Option<Value>>;
}

