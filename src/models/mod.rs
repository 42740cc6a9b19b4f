//! Data models for the issue-tracking backend.
//!
//! Records pass through unchanged from the REST API; the client performs no
//! schema validation beyond optional-field handling for display. Types here
//! cover:
//!
//! - `Department`, `Member`: admin-side org structure and staffing
//! - `Issue` and friends: citizen reports with the server-computed
//!   analysis fields (priority, vision confidence, SLA, geo)
//! - `HeatmapCell`: per-city aggregates for the geographic view

pub mod department;
pub mod issue;
pub mod member;
pub mod stats;

pub use department::{Department, NewDepartment};
pub use issue::{
    Issue, IssueEvent, IssueImage, IssueList, IssueState, ReviewOutcome, ReviewRequest,
    ReviewStatus,
};
pub use member::{Member, NewMember, Role};
pub use stats::{HeatmapCell, Intensity};
