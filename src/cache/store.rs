//! Shared stale-while-revalidate cache over the REST backend.
//!
//! `FetchCache` keeps one entry per resource key. A consumer mounts with
//! [`FetchCache::watch`] and gets the cached value immediately; a background
//! fetch refreshes the entry when it is missing or stale, and every consumer
//! of that key observes the update. [`FetchCache::revalidate`] forces a
//! refresh after a mutation.
//!
//! Entries live for the lifetime of the process. [`FetchCache::clear`] exists
//! for logout and for test isolation; there is no timed eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::Fetcher;

/// Entries older than this are refetched on the next mount.
const DEFAULT_STALE_MINUTES: i64 = 5;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// No fetch has ever resolved for this key.
    Idle,
    /// A request is in flight (possibly with stale data still served).
    Loading,
    /// The last applied response succeeded.
    Ready,
    /// The last applied response failed; any earlier value is retained.
    Error,
}

/// Point-in-time view of a cache entry, handed to display code.
#[derive(Debug, Clone)]
pub struct FetchState {
    pub data: Option<Arc<Value>>,
    pub error: Option<String>,
    pub status: EntryStatus,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FetchState {
    fn idle() -> Self {
        Self {
            data: None,
            error: None,
            status: EntryStatus::Idle,
            fetched_at: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.status == EntryStatus::Loading
    }

    /// Deserialize the cached payload for display. Returns `None` when no
    /// data is cached or the payload does not match `T`; the mismatch is
    /// logged rather than propagated so a bad payload degrades like a miss.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.data.as_ref()?;
        match serde_json::from_value(Value::clone(value)) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Failed to parse cached payload");
                None
            }
        }
    }

    /// Human-readable entry age for status bars.
    pub fn age_display(&self) -> String {
        let Some(fetched_at) = self.fetched_at else {
            return "never".to_string();
        };
        let minutes = (Utc::now() - fetched_at).num_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// A request currently on the wire for some key.
struct Inflight {
    ticket: u64,
    /// Forced requests come from `revalidate` and must postdate the caller's
    /// mutation; passive refreshes may join them, but not the other way round.
    forced: bool,
    done: watch::Receiver<bool>,
}

struct EntryState {
    value: Option<Arc<Value>>,
    error: Option<String>,
    status: EntryStatus,
    fetched_at: Option<DateTime<Utc>>,
    /// Tickets issue in request order; a response only applies if its ticket
    /// is newer than the last applied one, so late responses to superseded
    /// requests are discarded.
    next_ticket: u64,
    applied_ticket: u64,
    inflight: Option<Inflight>,
    version_tx: watch::Sender<u64>,
    version: u64,
}

impl EntryState {
    fn new() -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            value: None,
            error: None,
            status: EntryStatus::Idle,
            fetched_at: None,
            next_ticket: 0,
            applied_ticket: 0,
            inflight: None,
            version_tx,
            version: 0,
        }
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
        let _ = self.version_tx.send(self.version);
    }

    fn snapshot(&self) -> FetchState {
        FetchState {
            data: self.value.clone(),
            error: self.error.clone(),
            status: if self.inflight.is_some() {
                EntryStatus::Loading
            } else {
                self.status
            },
            fetched_at: self.fetched_at,
        }
    }

    fn is_stale(&self, stale_after: Duration) -> bool {
        match self.fetched_at {
            Some(at) => Utc::now() - at > stale_after,
            None => true,
        }
    }
}

struct CacheInner {
    fetcher: Arc<dyn Fetcher>,
    stale_after: Duration,
    entries: Mutex<HashMap<String, EntryState>>,
}

impl CacheInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, EntryState>> {
        // Poisoning only happens if a holder panicked; the map itself is
        // still coherent, so keep serving it
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Process-wide fetch cache. Clone is cheap and every clone shares the same
/// entries, so a revalidation triggered by one view is visible to all.
#[derive(Clone)]
pub struct FetchCache {
    inner: Arc<CacheInner>,
}

impl FetchCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_stale_after(fetcher, Duration::minutes(DEFAULT_STALE_MINUTES))
    }

    pub fn with_stale_after(fetcher: Arc<dyn Fetcher>, stale_after: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                stale_after,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Mount a consumer on `key`.
    ///
    /// An empty key is the "do not fetch yet" sentinel used while an input
    /// (say, the signed-in user id) is not available; the returned handle
    /// stays idle and issues no network request. Otherwise the entry's
    /// current value is served immediately and a background fetch is started
    /// when the entry is missing or stale.
    ///
    /// A key change is a new `watch` call: entries are per key, so switching
    /// back to a previously watched key is instant, and one key's payload can
    /// never surface through another key's handle.
    pub fn watch(&self, key: &str) -> WatchHandle {
        if key.is_empty() {
            return WatchHandle {
                key: String::new(),
                inner: Arc::clone(&self.inner),
                rx: None,
            };
        }

        let mut entries = self.inner.entries();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(EntryState::new);
        let rx = entry.version_tx.subscribe();
        if entry.inflight.is_none() && (entry.value.is_none() || entry.is_stale(self.inner.stale_after))
        {
            Self::spawn_fetch(&self.inner, entries, key, false);
        }

        WatchHandle {
            key: key.to_string(),
            inner: Arc::clone(&self.inner),
            rx: Some(rx),
        }
    }

    /// Peek at the current entry for `key` without mounting or fetching.
    pub fn snapshot(&self, key: &str) -> FetchState {
        let entries = self.inner.entries();
        entries
            .get(key)
            .map(|entry| entry.snapshot())
            .unwrap_or_else(FetchState::idle)
    }

    /// Force a refetch of `key` and wait for the result.
    ///
    /// Concurrent revalidations of one key coalesce into a single request;
    /// every caller sees the state left behind by that request. Called on the
    /// empty sentinel key this is a no-op.
    pub async fn revalidate(&self, key: &str) -> FetchState {
        if key.is_empty() {
            return FetchState::idle();
        }

        let mut done = {
            let mut entries = self.inner.entries();
            let joinable = entries
                .entry(key.to_string())
                .or_insert_with(EntryState::new)
                .inflight
                .as_ref()
                .filter(|inflight| inflight.forced)
                .map(|inflight| inflight.done.clone());
            match joinable {
                // Join the revalidation already on the wire
                Some(done) => done,
                // A passive refresh may predate the caller's mutation, so a
                // forced request is issued even if one overlaps it; ticket
                // order decides which response wins
                None => Self::spawn_fetch(&self.inner, entries, key, true),
            }
        };

        // wait_for returns Err only if the fetch task dropped the sender
        // without completing, in which case the entry already holds whatever
        // state is worth reporting
        let _ = done.wait_for(|finished| *finished).await;
        self.snapshot(key)
    }

    /// Load several keys in parallel and wait for all of them, the way a
    /// detail page pulls its record and its sub-list together.
    pub async fn prefetch(&self, keys: &[&str]) -> Vec<FetchState> {
        futures::future::join_all(keys.iter().map(|key| self.revalidate(key))).await
    }

    /// Drop every entry. In-flight responses for dropped entries are
    /// discarded on arrival (their tickets belong to the old entry).
    pub fn clear(&self) {
        let mut entries = self.inner.entries();
        // Wake consumers so they re-read the now-empty state
        for entry in entries.values_mut() {
            entry.bump_version();
        }
        entries.clear();
        debug!("Fetch cache cleared");
    }

    fn spawn_fetch(
        inner: &Arc<CacheInner>,
        mut entries: MutexGuard<'_, HashMap<String, EntryState>>,
        key: &str,
        forced: bool,
    ) -> watch::Receiver<bool> {
        let Some(entry) = entries.get_mut(key) else {
            // Caller inserts the entry before spawning; an absent entry means
            // the map was cleared in between, so report "already done"
            let (_, rx) = watch::channel(true);
            return rx;
        };

        entry.next_ticket += 1;
        let ticket = entry.next_ticket;
        let (done_tx, done_rx) = watch::channel(false);
        entry.inflight = Some(Inflight {
            ticket,
            forced,
            done: done_rx.clone(),
        });
        entry.bump_version();
        drop(entries);

        debug!(key, ticket, forced, "Issuing fetch");
        let inner = Arc::clone(inner);
        let key = key.to_string();
        tokio::spawn(async move {
            let result = inner.fetcher.fetch(&key).await;
            Self::apply(&inner, &key, ticket, result);
            let _ = done_tx.send(true);
        });

        done_rx
    }

    fn apply(inner: &Arc<CacheInner>, key: &str, ticket: u64, result: anyhow::Result<Value>) {
        let mut entries = inner.entries();
        let Some(entry) = entries.get_mut(key) else {
            debug!(key, ticket, "Entry gone before response arrived, discarding");
            return;
        };

        if ticket > entry.applied_ticket {
            entry.applied_ticket = ticket;
            match result {
                Ok(value) => {
                    entry.value = Some(Arc::new(value));
                    entry.error = None;
                    entry.status = EntryStatus::Ready;
                    entry.fetched_at = Some(Utc::now());
                }
                Err(e) => {
                    // Stale data beats no data: the old value and its
                    // timestamp survive a failed refresh
                    warn!(key, error = %e, "Fetch failed");
                    entry.error = Some(format!("{:#}", e));
                    entry.status = EntryStatus::Error;
                }
            }
        } else {
            debug!(key, ticket, applied = entry.applied_ticket, "Discarding superseded response");
        }

        if entry.inflight.as_ref().map(|i| i.ticket) == Some(ticket) {
            entry.inflight = None;
        }
        entry.bump_version();
    }
}

/// A mounted consumer of one cache key. Dropping the handle unmounts the
/// consumer; it never cancels the underlying request, whose response still
/// updates the shared cache for everyone else.
pub struct WatchHandle {
    key: String,
    inner: Arc<CacheInner>,
    rx: Option<watch::Receiver<u64>>,
}

impl WatchHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current view of the entry.
    pub fn snapshot(&self) -> FetchState {
        if self.key.is_empty() {
            return FetchState::idle();
        }
        let entries = self.inner.entries();
        entries
            .get(&self.key)
            .map(|entry| entry.snapshot())
            .unwrap_or_else(FetchState::idle)
    }

    /// Wait for the next entry update. Returns `false` when no further
    /// updates can arrive (sentinel handle, or the entry was dropped).
    pub async fn changed(&mut self) -> bool {
        match self.rx.as_mut() {
            Some(rx) => rx.changed().await.is_ok(),
            None => false,
        }
    }

    /// Wait until the entry is not loading and return it. Resolves
    /// immediately for sentinel handles.
    pub async fn ready(&mut self) -> FetchState {
        loop {
            let state = self.snapshot();
            if !state.loading() {
                return state;
            }
            if !self.changed().await {
                return self.snapshot();
            }
        }
    }

    /// Force a refetch of this handle's key. See [`FetchCache::revalidate`].
    pub async fn revalidate(&self) -> FetchState {
        FetchCache {
            inner: Arc::clone(&self.inner),
        }
        .revalidate(&self.key)
        .await
    }
}
