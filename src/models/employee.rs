use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub project: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create payload after form decoding. `id` and `name` come from the caller
/// and must be non-empty; everything else is already coerced (empty -> None).
#[derive(Debug, Validate)]
pub struct NewEmployee {
    #[validate(length(min = 1, message = "id required"))]
    pub id: String,
    #[validate(length(min = 1, message = "name required"))]
    pub name: String,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub project: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub image_path: Option<String>,
}

/// Partial update. The outer `Option` is field presence; for nullable columns
/// the inner `Option` is the stored value, so `Some(None)` writes NULL.
#[derive(Debug, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub department: Option<Option<String>>,
    pub designation: Option<Option<String>>,
    pub project: Option<Option<String>>,
    pub kind: Option<Option<String>>,
    pub status: Option<Option<String>>,
    pub image_path: Option<Option<String>>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department.is_none()
            && self.designation.is_none()
            && self.project.is_none()
            && self.kind.is_none()
            && self.status.is_none()
            && self.image_path.is_none()
    }
}
