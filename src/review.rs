//! Manual review queue flow.
//!
//! The queue reads `/issues?state=reported` through the shared fetch cache
//! and layers an [`ExclusionOverlay`] on top: approving or rejecting an issue
//! hides it from the queue immediately, while the authoritative list catches
//! up through a revalidation. Every mutating action follows the same shape:
//! issue the request, apply the optimistic change only on success, then
//! revalidate the affected key.

use anyhow::Result;
use tracing::debug;

use crate::api::ApiClient;
use crate::cache::{ExclusionOverlay, FetchCache, FetchState, WatchHandle};
use crate::models::{Issue, IssueList, IssueState, ReviewOutcome, ReviewStatus};

pub struct ReviewQueue {
    cache: FetchCache,
    key: String,
    hidden: ExclusionOverlay,
}

impl ReviewQueue {
    pub fn new(cache: FetchCache) -> Self {
        Self {
            cache,
            key: format!("/issues?state={}", IssueState::Reported.tag()),
            hidden: ExclusionOverlay::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mount a consumer on the queue's cache entry.
    pub fn watch(&self) -> WatchHandle {
        self.cache.watch(&self.key)
    }

    pub fn state(&self) -> FetchState {
        self.cache.snapshot(&self.key)
    }

    /// Issues awaiting review, minus the ones this session already decided.
    pub fn pending(&self) -> Vec<Issue> {
        let Some(list) = self.state().parse::<IssueList>() else {
            return Vec::new();
        };
        list.items
            .into_iter()
            .filter(|issue| !self.hidden.is_hidden(&issue.id))
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Submit a decision. The issue is hidden from the queue only after the
    /// backend accepts it, then the cached list is revalidated; on failure
    /// nothing changes locally and the error propagates to the caller.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        issue_id: &str,
        status: ReviewStatus,
    ) -> Result<ReviewOutcome> {
        let outcome = api.review_issue(issue_id, status).await?;
        self.mark_decided(issue_id);
        self.cache.revalidate(&self.key).await;
        Ok(outcome)
    }

    /// Optimistically hide an issue whose decision was accepted.
    pub fn mark_decided(&mut self, issue_id: &str) {
        debug!(issue_id, "Hiding reviewed issue from queue");
        self.hidden.hide(issue_id);
    }

    /// Undo an optimistic hide, for callers that hide before the mutation
    /// settles and need to back out of a failure.
    pub fn rollback(&mut self, issue_id: &str) {
        debug!(issue_id, "Restoring issue to queue");
        self.hidden.unhide(issue_id);
    }

    /// Full reload: drop every local hide and refetch the authoritative
    /// list. The server's view supersedes this session's overlay.
    pub async fn reload(&mut self) -> FetchState {
        self.hidden.reconcile();
        self.cache.revalidate(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::testing::MockFetcher;
    use crate::cache::Fetcher;

    use super::*;

    fn reported(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "description": "Overflowing bin",
            "state": "reported",
            "city": "Riverview",
            "locality": "North",
            "created_at": "2025-06-01T09:30:00Z",
            "images": []
        })
    }

    fn queue_with(fetcher: &Arc<MockFetcher>) -> ReviewQueue {
        ReviewQueue::new(FetchCache::new(Arc::clone(fetcher) as Arc<dyn Fetcher>))
    }

    #[tokio::test]
    async fn test_decision_hides_issue_before_list_catches_up() {
        let fetcher = MockFetcher::new();
        fetcher.push_ok(json!({"items": [reported("i-1"), reported("i-2")]}));
        let mut queue = queue_with(&fetcher);

        queue.watch().ready().await;
        assert_eq!(queue.pending_count(), 2);

        // Decision accepted; the cached list still contains i-1 until the
        // revalidation lands, but the queue must not show it
        queue.mark_decided("i-1");
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.pending()[0].id, "i-2");

        // Revalidated list still includes i-1 (server lagging): stays hidden
        fetcher.push_ok(json!({"items": [reported("i-1"), reported("i-2")]}));
        queue.cache.revalidate(queue.key()).await;
        assert_eq!(queue.pending_count(), 1);

        // Next revalidation drops it server-side: same visible result
        fetcher.push_ok(json!({"items": [reported("i-2")]}));
        queue.cache.revalidate(queue.key()).await;
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.pending()[0].id, "i-2");
    }

    #[tokio::test]
    async fn test_rollback_restores_eagerly_hidden_issue() {
        let fetcher = MockFetcher::new();
        fetcher.push_ok(json!({"items": [reported("i-1"), reported("i-2")]}));
        let mut queue = queue_with(&fetcher);
        queue.watch().ready().await;

        // Caller hid eagerly, then the mutation failed
        queue.mark_decided("i-1");
        assert_eq!(queue.pending_count(), 1);
        queue.rollback("i-1");
        assert_eq!(queue.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_supersedes_overlay() {
        let fetcher = MockFetcher::new();
        fetcher.push_ok(json!({"items": [reported("i-1"), reported("i-2")]}));
        let mut queue = queue_with(&fetcher);
        queue.watch().ready().await;

        queue.mark_decided("i-1");
        queue.mark_decided("i-2");
        assert_eq!(queue.pending_count(), 0);

        // Full reload: the authoritative list wins again
        fetcher.push_ok(json!({"items": [reported("i-1")]}));
        queue.reload().await;
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.pending()[0].id, "i-1");
    }

    #[tokio::test]
    async fn test_failed_submit_leaves_queue_untouched() {
        let fetcher = MockFetcher::new();
        fetcher.push_ok(json!({"items": [reported("i-1")]}));
        let mut queue = queue_with(&fetcher);
        queue.watch().ready().await;

        // Nothing is listening on this port, so the mutation fails at the
        // transport layer
        let api = ApiClient::new("http://127.0.0.1:9").expect("client");
        let result = queue.submit(&api, "i-1", ReviewStatus::Approved).await;

        assert!(result.is_err());
        assert_eq!(queue.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_queue_before_first_resolution() {
        let fetcher = MockFetcher::new();
        fetcher.push_ok(json!({"items": []}));
        let queue = queue_with(&fetcher);

        // No data yet: pending() degrades to empty rather than panicking
        assert_eq!(queue.pending_count(), 0);

        queue.watch().ready().await;
        assert_eq!(queue.pending_count(), 0);
    }
}
