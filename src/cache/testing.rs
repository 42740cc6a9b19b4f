//! Scripted fetcher for cache tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use super::Fetcher;

/// Serves queued responses in call order, each optionally held back until
/// its gate fires, so tests control completion order precisely.
pub(crate) struct MockFetcher {
    calls: AtomicUsize,
    script: Mutex<VecDeque<(Option<oneshot::Receiver<()>>, anyhow::Result<Value>)>>,
}

impl MockFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn push_ok(&self, value: Value) {
        self.script
            .lock()
            .expect("script lock")
            .push_back((None, Ok(value)));
    }

    pub(crate) fn push_err(&self, msg: &str) {
        self.script
            .lock()
            .expect("script lock")
            .push_back((None, Err(anyhow!("{}", msg))));
    }

    /// Queue a response that is held until the returned sender fires.
    pub(crate) fn push_gated(&self, value: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script
            .lock()
            .expect("script lock")
            .push_back((Some(rx), Ok(value)));
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, key: &str) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (gate, result) = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted fetch for {}", key));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }
}
