use serde::{Deserialize, Serialize};

/// Access level of a department member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Officer,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Worker => write!(f, "Field Worker"),
            Role::Officer => write!(f, "Department Officer"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// Staff member of a department. Created via form submission
/// (`POST /admin/members`), removed via `DELETE /admin/members/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub current_workload: i64,
    #[serde(default = "default_max_workload")]
    pub max_workload: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub phone: Option<String>,
    pub city: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Workload ceiling when the backend omits the field.
fn default_max_workload() -> i64 {
    10
}

impl Member {
    pub fn workload_display(&self) -> String {
        format!("{}/{}", self.current_workload, self.max_workload)
    }

    /// Fraction of capacity in use, clamped to [0, 1] for meter rendering.
    pub fn workload_ratio(&self) -> f64 {
        if self.max_workload <= 0 {
            return 1.0;
        }
        (self.current_workload as f64 / self.max_workload as f64).clamp(0.0, 1.0)
    }

    pub fn location_display(&self) -> &str {
        self.city.as_deref().unwrap_or("Unassigned")
    }
}

/// Payload for `POST /admin/members`. The initial password is consumed by the
/// auth collaborator server-side and never stored locally.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub phone: String,
    pub city: String,
    pub max_workload: i64,
    pub department_id: String,
    pub locality: String,
}
