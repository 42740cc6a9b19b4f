use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::api::ApiClient;

/// Source of truth the fetch cache reads through. A key is a GET path with
/// its query string (`/admin/departments`, `/issues?state=reported`, ...).
///
/// The cache owns a `Fetcher` behind an `Arc`, so implementations must be
/// shareable across tasks. Tests inject a scripted fetcher for isolation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Value>;
}

#[async_trait]
impl Fetcher for ApiClient {
    async fn fetch(&self, key: &str) -> Result<Value> {
        self.get_value(key).await
    }
}
