use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle tag of a citizen report. The set is server-defined; unknown
/// tags deserialize as `Other` so new states never break display code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Reported,
    PendingVerification,
    Validated,
    Assigned,
    InProgress,
    PendingConfirmation,
    Resolved,
    Closed,
    Rejected,
    Escalated,
    #[serde(untagged)]
    Other(String),
}

impl IssueState {
    /// Wire-format tag, as used in `state=` query parameters.
    pub fn tag(&self) -> &str {
        match self {
            IssueState::Reported => "reported",
            IssueState::PendingVerification => "pending_verification",
            IssueState::Validated => "validated",
            IssueState::Assigned => "assigned",
            IssueState::InProgress => "in_progress",
            IssueState::PendingConfirmation => "pending_confirmation",
            IssueState::Resolved => "resolved",
            IssueState::Closed => "closed",
            IssueState::Rejected => "rejected",
            IssueState::Escalated => "escalated",
            IssueState::Other(tag) => tag,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            IssueState::Reported => "Reported".to_string(),
            IssueState::PendingVerification => "Pending Verification".to_string(),
            IssueState::Validated => "Validated".to_string(),
            IssueState::Assigned => "Assigned".to_string(),
            IssueState::InProgress => "In Progress".to_string(),
            IssueState::PendingConfirmation => "Pending Confirmation".to_string(),
            IssueState::Resolved => "Resolved".to_string(),
            IssueState::Closed => "Closed".to_string(),
            IssueState::Rejected => "Rejected".to_string(),
            IssueState::Escalated => "Escalated".to_string(),
            IssueState::Other(tag) => tag.replace('_', " "),
        }
    }

    /// Terminal states need no further citizen or staff action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IssueState::Resolved | IssueState::Closed | IssueState::Rejected
        )
    }
}

/// Evidence photo pair attached to a report. The annotated path carries the
/// vision model's detection boxes when analysis has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueImage {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub annotated_path: String,
}

impl IssueImage {
    /// Prefer the annotated image for display, like the review queue does.
    pub fn display_path(&self) -> &str {
        if self.annotated_path.is_empty() {
            &self.file_path
        } else {
            &self.annotated_path
        }
    }
}

/// One step of the server-side processing pipeline, shown as a timeline on
/// the issue detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    pub id: String,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A citizen report. The server computes every analytical field; the client
/// only displays them, so almost everything past the core identity is
/// optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub state: IssueState,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub full_address: Option<String>,
    pub priority: Option<i64>,
    pub priority_reason: Option<String>,
    pub category: Option<String>,
    /// Vision model confidence in [0, 1].
    pub confidence: Option<f64>,
    pub detections_count: Option<i64>,
    pub validation_source: Option<String>,
    pub geo_status: Option<String>,
    pub is_duplicate: Option<bool>,
    pub parent_issue_id: Option<String>,
    pub nearby_count: Option<i64>,
    pub department: Option<String>,
    pub assigned_member: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub annotated_urls: Option<Vec<String>>,
    pub proof_image_url: Option<String>,
    pub sla_hours: Option<i64>,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub agent_flow: Option<Vec<IssueEvent>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// List endpoints embed image records; detail endpoints use the
    /// flat *_urls fields instead.
    #[serde(default)]
    pub images: Vec<IssueImage>,
}

impl Issue {
    pub fn location_display(&self) -> &str {
        self.full_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.locality.as_deref())
            .unwrap_or("Unknown location")
    }

    pub fn first_image(&self) -> Option<&IssueImage> {
        self.images.first()
    }
}

/// Envelope returned by `GET /issues`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueList {
    #[serde(default)]
    pub items: Vec<Issue>,
}

/// Decision posted to `POST /admin/issues/{id}/review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Rejected,
}

/// Body of a review request, `{"status": "approved"|"rejected"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub status: ReviewStatus,
}

/// Acknowledgement from the review endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewOutcome {
    #[serde(default)]
    pub message: String,
}
