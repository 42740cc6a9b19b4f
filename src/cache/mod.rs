//! Shared fetch cache with stale-while-revalidate semantics.
//!
//! This module provides:
//! - `FetchCache` / `WatchHandle`: the keyed, process-wide cache every view
//!   reads through, with coalesced revalidation and in-order application of
//!   responses
//! - `Fetcher`: the seam between the cache and the network (implemented by
//!   `ApiClient`, scripted in tests)
//! - `ExclusionOverlay`: optimistic local removals layered over a cached list

pub mod fetcher;
pub mod overlay;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::Fetcher;
pub use overlay::ExclusionOverlay;
pub use store::{EntryStatus, FetchCache, FetchState, WatchHandle};
