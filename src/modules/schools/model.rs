use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A school. `code` is the short token users type during registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub max_users: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolDto {
    #[validate(length(min = 2, max = 200))]
    pub name: String,
    #[validate(length(min = 4, max = 20))]
    pub code: String,
    pub address: Option<String>,
    pub max_users: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifySchoolCodeDto {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolAdminDto {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolAdminResponse {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub school_id: Uuid,
    pub school_name: String,
}
