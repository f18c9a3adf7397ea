use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::users::model::{User, UserSummary};
use crate::utils::errors::AppError;

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, role, school_id, is_verified, created_at, updated_at
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(user)
    }

    /// Students visible to a teacher.
    ///
    /// A school teacher sees every student of their school; an independent
    /// teacher (no school) sees only students linked through invites.
    #[instrument(skip(db))]
    pub async fn students_for_teacher(
        db: &PgPool,
        teacher_id: Uuid,
        school_id: Option<Uuid>,
    ) -> Result<Vec<UserSummary>, AppError> {
        let students = match school_id {
            Some(school_id) => {
                sqlx::query_as::<_, UserSummary>(
                    "SELECT id, full_name, email, role, school_id
                     FROM users
                     WHERE role = 'student' AND school_id = $1
                     ORDER BY full_name",
                )
                .bind(school_id)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserSummary>(
                    "SELECT u.id, u.full_name, u.email, u.role, u.school_id
                     FROM users u
                     JOIN teacher_student_links l ON l.student_id = u.id
                     WHERE l.teacher_id = $1
                     ORDER BY u.full_name",
                )
                .bind(teacher_id)
                .fetch_all(db)
                .await?
            }
        };

        Ok(students)
    }
}
