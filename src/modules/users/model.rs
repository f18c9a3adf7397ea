//! User entities and role definitions.
//!
//! The `users` table backs every account in the system. Roles are stored as
//! plain text; [`UserRole`] is the closed set the application accepts.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// System roles, ordered from most to least privileged.
///
/// `school_id` is `None` for superadmins and for independent teachers and
/// students that registered without a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Superadmin,
    SchoolAdmin,
    Teacher,
    Student,
    Parent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Superadmin => "superadmin",
            UserRole::SchoolAdmin => "school_admin",
            UserRole::Teacher => "teacher",
            UserRole::Student => "student",
            UserRole::Parent => "parent",
        }
    }

    pub fn parse(role: &str) -> Option<UserRole> {
        match role {
            "superadmin" => Some(UserRole::Superadmin),
            "school_admin" => Some(UserRole::SchoolAdmin),
            "teacher" => Some(UserRole::Teacher),
            "student" => Some(UserRole::Student),
            "parent" => Some(UserRole::Parent),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user row, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Compact user representation for directory listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub school_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [
            UserRole::Superadmin,
            UserRole::SchoolAdmin,
            UserRole::Teacher,
            UserRole::Student,
            UserRole::Parent,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::parse(""), None);
        assert_eq!(UserRole::parse("Teacher"), None);
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&UserRole::SchoolAdmin).unwrap();
        assert_eq!(json, r#""school_admin""#);
    }
}
