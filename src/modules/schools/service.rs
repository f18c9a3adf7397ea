use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::metrics::{track_school_created, track_user_created};
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{CreateSchoolAdminDto, CreateSchoolDto, School, SchoolAdminResponse};

const SCHOOL_COLUMNS: &str = "id, name, code, address, max_users, created_at, updated_at";

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, dto))]
    pub async fn create_school(db: &PgPool, dto: CreateSchoolDto) -> Result<School, AppError> {
        let name_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schools WHERE name = $1")
                .bind(&dto.name)
                .fetch_one(db)
                .await?;
        if name_taken > 0 {
            return Err(AppError::bad_request(
                "School with this name already exists",
            ));
        }

        let school = sqlx::query_as::<_, School>(&format!(
            "INSERT INTO schools (name, code, address, max_users)
             VALUES ($1, $2, $3, $4)
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(&dto.address)
        .bind(dto.max_users)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request("School with this code already exists");
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        track_school_created();
        Ok(school)
    }

    #[instrument(skip(db))]
    pub async fn get_all_schools(db: &PgPool) -> Result<Vec<School>, AppError> {
        let schools = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools ORDER BY name"
        ))
        .fetch_all(db)
        .await?;

        Ok(schools)
    }

    #[instrument(skip(db))]
    pub async fn get_school(db: &PgPool, id: Uuid) -> Result<School, AppError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("School not found"))?;

        Ok(school)
    }

    #[instrument(skip(db))]
    pub async fn find_by_code(db: &PgPool, code: &str) -> Result<School, AppError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("School with this code not found"))?;

        Ok(school)
    }

    /// Creates a pre-verified school admin account for the given school.
    #[instrument(skip(db, dto))]
    pub async fn create_school_admin(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateSchoolAdminDto,
    ) -> Result<SchoolAdminResponse, AppError> {
        let school = Self::get_school(db, school_id).await?;

        let hashed_password = hash_password(&dto.password)?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (full_name, email, password, role, school_id, is_verified)
             VALUES ($1, $2, $3, $4, $5, TRUE)
             RETURNING id",
        )
        .bind(&dto.full_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(UserRole::SchoolAdmin.as_str())
        .bind(school.id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request("User with this email already exists");
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        track_user_created(UserRole::SchoolAdmin.as_str());

        Ok(SchoolAdminResponse {
            user_id,
            full_name: dto.full_name,
            email: dto.email,
            role: UserRole::SchoolAdmin.as_str().to_string(),
            school_id: school.id,
            school_name: school.name,
        })
    }
}
