use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// A registration request row, without the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RegistrationRequest {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub school_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// School-bound registration: the school must exist.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRegistrationDto {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4))]
    pub password: String,
    pub role: String,
    pub school_id: Uuid,
}

/// Independent registration: no school, or an optional one.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IndependentRegistrationDto {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4))]
    pub password: String,
    pub role: String,
    pub school_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            r#""pending""#
        );
        assert_eq!(RequestStatus::Rejected.as_str(), "rejected");
    }
}
