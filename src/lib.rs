//! Client core for a municipal issue-tracking service.
//!
//! This crate backs the citizen and admin dashboards: it owns the REST API
//! client, the shared stale-while-revalidate fetch cache every view reads
//! through, the optimistic-update overlay used by the review queue, and the
//! persisted session/config. Rendering lives elsewhere; everything here is
//! data plumbing.
//!
//! The usual shape of a page is: mount a [`cache::WatchHandle`] on a resource
//! key, render whatever the snapshot holds, and after a mutation call
//! `revalidate` so the next authoritative read reconciles.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use towncache::api::ApiClient;
//! use towncache::cache::FetchCache;
//! use towncache::models::{Department, NewDepartment};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let api = ApiClient::new("https://api.city.example")?;
//! let cache = FetchCache::new(Arc::new(api.clone()));
//!
//! let mut departments = cache.watch("/admin/departments");
//! let listed: Option<Vec<Department>> = departments.ready().await.parse();
//!
//! api.create_department(&NewDepartment {
//!     name: "Public Works".to_string(),
//!     code: "PWD".to_string(),
//!     description: String::new(),
//!     default_sla_hours: 48,
//! })
//! .await?;
//! departments.revalidate().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod review;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{FetchCache, FetchState, WatchHandle};
pub use config::Config;
pub use review::ReviewQueue;
