use serde::{Deserialize, Serialize};

/// Organizational unit that issues are routed to. Server-owned; the client
/// treats departments as read-mostly and creates them via [`NewDepartment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub default_sla_hours: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub member_count: i64,
}

fn default_true() -> bool {
    true
}

impl Department {
    pub fn status_display(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    pub fn sla_display(&self) -> String {
        format!("{}h", self.default_sla_hours)
    }
}

/// Payload for `POST /admin/departments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    pub description: String,
    pub default_sla_hours: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_department() {
        let json = r#"{"id":"d-1","name":"Public Works","code":"PWD","description":"Roads and drainage","default_sla_hours":48,"is_active":true,"member_count":0}"#;
        let dept: Department = serde_json::from_str(json).expect("Failed to parse department");
        assert_eq!(dept.name, "Public Works");
        assert_eq!(dept.code, "PWD");
        assert_eq!(dept.default_sla_hours, 48);
        assert_eq!(dept.member_count, 0);
        assert_eq!(dept.status_display(), "Active");
        assert_eq!(dept.sla_display(), "48h");
    }

    #[test]
    fn test_parse_department_missing_optionals() {
        // Backend may omit description/member_count on freshly created rows
        let json = r#"{"id":"d-2","name":"Sanitation","code":"SAN","default_sla_hours":24}"#;
        let dept: Department = serde_json::from_str(json).expect("Failed to parse department");
        assert_eq!(dept.description, "");
        assert_eq!(dept.member_count, 0);
        assert!(dept.is_active);
    }
}
