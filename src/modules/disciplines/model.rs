use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A subject taught at a school for a specific grade, e.g. "Physics", 7.
/// `(school_id, subject, grade)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Discipline {
    pub id: Uuid,
    pub school_id: Uuid,
    pub subject: String,
    pub grade: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDisciplineDto {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 1, max = 11))]
    pub grade: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDisciplineDto {
    pub teacher_id: Uuid,
}

/// A teacher-discipline assignment. Removal is a soft delete
/// (`is_active = false`); re-assigning reactivates the existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherDiscipline {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub discipline_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
}

/// A teacher's view of one of their assigned disciplines.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TeacherDisciplineView {
    pub id: Uuid,
    pub discipline_id: Uuid,
    pub subject: String,
    pub grade: i32,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
