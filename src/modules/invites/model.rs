//! Invite-code entities and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A single-use invite code owned by a teacher.
///
/// `used` starts false and flips to true exactly once, together with the
/// creation of one teacher-student link. Expiry is computed from
/// `created_at` on every redemption attempt; expired codes keep
/// `used = false`, so `used` alone never proves a code is redeemable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InviteCode {
    pub id: Uuid,
    pub code: String,
    pub teacher_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
}

/// A persisted teacher-student link. `(teacher_id, student_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherStudentLink {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
}

/// Minimal view of a user consulted during redemption.
#[derive(Debug, Clone, FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub role: String,
}

/// Closed set of redemption results.
///
/// These are ordinary return values, not errors: every caller has to decide
/// what each branch means for its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Success,
    Expired,
    InvalidCode,
    StudentNotFound,
    AlreadyLinked,
}

impl RedemptionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionOutcome::Success => "success",
            RedemptionOutcome::Expired => "expired",
            RedemptionOutcome::InvalidCode => "invalid",
            RedemptionOutcome::StudentNotFound => "student_not_found",
            RedemptionOutcome::AlreadyLinked => "already_linked",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UseInviteDto {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteCodeResponse {
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InviteCode> for InviteCodeResponse {
    fn from(invite: InviteCode) -> Self {
        Self {
            code: invite.code,
            created_at: invite.created_at,
        }
    }
}

/// One row of a teacher's own invite listing.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct InviteSummary {
    pub id: Uuid,
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LinkedStudent {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LinkedTeacher {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}
