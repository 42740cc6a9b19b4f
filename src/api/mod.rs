//! REST API client module for the issue-tracker backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! admin, issues, and stats endpoints over JSON.
//!
//! Requests carry a JWT bearer token obtained from the auth collaborator
//! and persisted by the [`crate::auth`] module.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
