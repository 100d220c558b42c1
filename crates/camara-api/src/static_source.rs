//! A [`DataSource`] answering from canned responses.
//!
//! Used to replay captured API payloads and to drive the pipeline in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::source::{DataSource, QueryParams};

#[derive(Debug, Clone)]
enum Canned {
    Body(Value),
    Status(u16),
}

/// In-memory source keyed by exact URL. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn respond(&self, url: impl Into<String>, body: Value) -> &Self {
        self.lock_responses().insert(url.into(), Canned::Body(body));
        self
    }

    /// Answer `url` with a bare HTTP status.
    pub fn fail(&self, url: impl Into<String>, status: u16) -> &Self {
        self.lock_responses().insert(url.into(), Canned::Status(status));
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<String, Canned>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> ApiResult<Option<Value>> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push((url.to_string(), params.to_vec())),
            Err(poisoned) => poisoned.into_inner().push((url.to_string(), params.to_vec())),
        }

        let canned = self.lock_responses().get(url).cloned();
        match canned {
            Some(Canned::Body(body)) => Ok(Some(body)),
            Some(Canned::Status(404)) | None => Ok(None),
            Some(Canned::Status(status)) => Err(ApiError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}
