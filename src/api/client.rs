//! API client for communicating with the issue-tracker REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the admin, issues, and stats endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    Department, HeatmapCell, Issue, IssueList, IssueState, Member, NewDepartment, NewMember,
    ReviewOutcome, ReviewRequest, ReviewStatus,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL when neither config nor environment supplies one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the issue-tracker backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .post(&url)
                .headers(self.auth_headers()?)
                .json(body)
                .send()
                .await
                .with_context(|| format!("Failed to send POST request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    // A 429 means the server never executed the request, so
                    // retrying a mutation here cannot double-apply it
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch an arbitrary GET path as raw JSON. This is the entry point the
    /// fetch cache uses, so payloads stay uninterpreted until display time.
    pub async fn get_value(&self, path: &str) -> Result<Value> {
        self.get(path).await
    }

    // ===== Departments =====

    /// Fetch all departments
    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        self.get("/admin/departments").await
    }

    /// Fetch a single department by id
    pub async fn get_department(&self, id: &str) -> Result<Department> {
        self.get(&format!("/admin/departments/{}", id)).await
    }

    /// Create a department and return the stored record
    pub async fn create_department(&self, new: &NewDepartment) -> Result<Department> {
        debug!(name = %new.name, code = %new.code, "Creating department");
        self.post("/admin/departments", new).await
    }

    // ===== Members =====

    /// Fetch the members of a department
    pub async fn list_members(&self, department_id: &str) -> Result<Vec<Member>> {
        self.get(&format!("/admin/members?department_id={}", department_id))
            .await
    }

    /// Create a member account and return the stored record
    pub async fn create_member(&self, new: &NewMember) -> Result<Member> {
        debug!(email = %new.email, department_id = %new.department_id, "Creating member");
        self.post("/admin/members", new).await
    }

    /// Remove a member
    pub async fn delete_member(&self, id: &str) -> Result<()> {
        debug!(member_id = %id, "Deleting member");
        self.delete(&format!("/admin/members/{}", id)).await
    }

    // ===== Issues =====

    /// Fetch issues in the given lifecycle state
    pub async fn issues_by_state(&self, state: &IssueState) -> Result<IssueList> {
        self.get(&format!("/issues?state={}", state.tag())).await
    }

    /// Fetch the issues reported by a citizen
    pub async fn issues_for_user(&self, user_id: &str) -> Result<IssueList> {
        self.get(&format!("/issues?user_id={}", user_id)).await
    }

    /// Fetch a single issue with its full analysis fields
    pub async fn get_issue(&self, id: &str) -> Result<Issue> {
        self.get(&format!("/issues/{}", id)).await
    }

    /// Approve or reject an issue in the manual review queue
    pub async fn review_issue(&self, id: &str, status: ReviewStatus) -> Result<ReviewOutcome> {
        debug!(issue_id = %id, ?status, "Reviewing issue");
        self.post(
            &format!("/admin/issues/{}/review", id),
            &ReviewRequest { status },
        )
        .await
    }

    // ===== Stats =====

    /// Fetch per-city issue aggregates for the heatmap
    pub async fn heatmap_stats(&self) -> Result<Vec<HeatmapCell>> {
        self.get("/admin/stats/heatmap").await
    }
}
