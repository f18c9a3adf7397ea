use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

use super::model::{
    CreateDisciplineDto, Discipline, TeacherDiscipline, TeacherDisciplineView,
};

const DISCIPLINE_COLUMNS: &str = "id, school_id, subject, grade, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str =
    "id, teacher_id, discipline_id, assigned_by, assigned_at, is_active";

pub struct DisciplineService;

impl DisciplineService {
    #[instrument(skip(db, dto))]
    pub async fn create_discipline(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateDisciplineDto,
    ) -> Result<Discipline, AppError> {
        let discipline = sqlx::query_as::<_, Discipline>(&format!(
            "INSERT INTO disciplines (school_id, subject, grade)
             VALUES ($1, $2, $3)
             RETURNING {DISCIPLINE_COLUMNS}"
        ))
        .bind(school_id)
        .bind(&dto.subject)
        .bind(dto.grade)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(format!(
                        "Discipline {} for grade {} already exists in this school",
                        dto.subject, dto.grade
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        info!(subject = %discipline.subject, grade = discipline.grade, "discipline created");
        Ok(discipline)
    }

    #[instrument(skip(db))]
    pub async fn school_disciplines(
        db: &PgPool,
        school_id: Uuid,
    ) -> Result<Vec<Discipline>, AppError> {
        let disciplines = sqlx::query_as::<_, Discipline>(&format!(
            "SELECT {DISCIPLINE_COLUMNS}
             FROM disciplines
             WHERE school_id = $1
             ORDER BY subject, grade"
        ))
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(disciplines)
    }

    #[instrument(skip(db))]
    pub async fn get_discipline(db: &PgPool, id: Uuid) -> Result<Discipline, AppError> {
        let discipline = sqlx::query_as::<_, Discipline>(&format!(
            "SELECT {DISCIPLINE_COLUMNS} FROM disciplines WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Discipline not found"))?;

        Ok(discipline)
    }

    /// Assigns a discipline to a teacher of the same school. An inactive
    /// assignment is reactivated instead of duplicated.
    #[instrument(skip(db))]
    pub async fn assign_to_teacher(
        db: &PgPool,
        discipline_id: Uuid,
        teacher_id: Uuid,
        assigned_by: Uuid,
        school_id: Uuid,
    ) -> Result<TeacherDiscipline, AppError> {
        let discipline = Self::get_discipline(db, discipline_id).await?;
        if discipline.school_id != school_id {
            return Err(AppError::forbidden(
                "Discipline belongs to a different school",
            ));
        }

        #[derive(sqlx::FromRow)]
        struct TeacherRow {
            role: String,
            school_id: Option<Uuid>,
        }

        let teacher =
            sqlx::query_as::<_, TeacherRow>("SELECT role, school_id FROM users WHERE id = $1")
                .bind(teacher_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found("Teacher not found"))?;

        if teacher.role != UserRole::Teacher.as_str() {
            return Err(AppError::bad_request("User is not a teacher"));
        }
        if teacher.school_id != Some(school_id) {
            return Err(AppError::forbidden("Teacher belongs to a different school"));
        }

        let existing = sqlx::query_as::<_, TeacherDiscipline>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS}
             FROM teacher_disciplines
             WHERE teacher_id = $1 AND discipline_id = $2"
        ))
        .bind(teacher_id)
        .bind(discipline_id)
        .fetch_optional(db)
        .await?;

        if let Some(assignment) = existing {
            if assignment.is_active {
                return Err(AppError::bad_request(
                    "Discipline already assigned to this teacher",
                ));
            }

            let reactivated = sqlx::query_as::<_, TeacherDiscipline>(&format!(
                "UPDATE teacher_disciplines
                 SET is_active = TRUE, assigned_by = $1, assigned_at = NOW()
                 WHERE id = $2
                 RETURNING {ASSIGNMENT_COLUMNS}"
            ))
            .bind(assigned_by)
            .bind(assignment.id)
            .fetch_one(db)
            .await?;

            info!(%teacher_id, %discipline_id, "assignment reactivated");
            return Ok(reactivated);
        }

        let assignment = sqlx::query_as::<_, TeacherDiscipline>(&format!(
            "INSERT INTO teacher_disciplines (teacher_id, discipline_id, assigned_by)
             VALUES ($1, $2, $3)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(teacher_id)
        .bind(discipline_id)
        .bind(assigned_by)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request("Discipline already assigned to this teacher");
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        info!(%teacher_id, %discipline_id, "discipline assigned");
        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn teacher_disciplines(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<TeacherDisciplineView>, AppError> {
        let assignments = sqlx::query_as::<_, TeacherDisciplineView>(
            "SELECT td.id, td.discipline_id, d.subject, d.grade, td.assigned_at
             FROM teacher_disciplines td
             JOIN disciplines d ON d.id = td.discipline_id
             WHERE td.teacher_id = $1 AND td.is_active = TRUE
             ORDER BY d.subject, d.grade",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(assignments)
    }

    /// Soft-deletes an active assignment.
    #[instrument(skip(db))]
    pub async fn unassign_from_teacher(
        db: &PgPool,
        discipline_id: Uuid,
        teacher_id: Uuid,
        school_id: Uuid,
    ) -> Result<(), AppError> {
        let discipline = Self::get_discipline(db, discipline_id).await?;
        if discipline.school_id != school_id {
            return Err(AppError::forbidden(
                "Discipline belongs to a different school",
            ));
        }

        let result = sqlx::query(
            "UPDATE teacher_disciplines
             SET is_active = FALSE
             WHERE teacher_id = $1 AND discipline_id = $2 AND is_active = TRUE",
        )
        .bind(teacher_id)
        .bind(discipline_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Assignment not found"));
        }

        info!(%teacher_id, %discipline_id, "assignment deactivated");
        Ok(())
    }
}
