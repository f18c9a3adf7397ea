use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::metrics::track_user_created;
use crate::modules::users::model::{User, UserRole};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{
    CreateRegistrationDto, IndependentRegistrationDto, RegistrationRequest, RequestStatus,
};

const REQUEST_COLUMNS: &str = "id, full_name, email, role, status, school_id, created_at";

/// Roles a visitor may request. Admin accounts are always provisioned by a
/// superadmin, never self-registered.
const SELF_REGISTER_ROLES: [UserRole; 3] = [UserRole::Teacher, UserRole::Student, UserRole::Parent];

pub struct RegistrationService;

impl RegistrationService {
    #[instrument(skip(db, dto))]
    pub async fn submit(
        db: &PgPool,
        dto: CreateRegistrationDto,
    ) -> Result<RegistrationRequest, AppError> {
        let school_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schools WHERE id = $1")
                .bind(dto.school_id)
                .fetch_one(db)
                .await?;
        if school_exists == 0 {
            return Err(AppError::not_found("School not found"));
        }

        Self::create_request(
            db,
            &dto.full_name,
            &dto.email,
            &dto.password,
            &dto.role,
            Some(dto.school_id),
        )
        .await
    }

    /// Registration without a school. Independent users keep
    /// `school_id = NULL` and never intersect with school-scoped accounts.
    #[instrument(skip(db, dto))]
    pub async fn submit_independent(
        db: &PgPool,
        dto: IndependentRegistrationDto,
    ) -> Result<RegistrationRequest, AppError> {
        if let Some(school_id) = dto.school_id {
            let school_exists =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schools WHERE id = $1")
                    .bind(school_id)
                    .fetch_one(db)
                    .await?;
            if school_exists == 0 {
                return Err(AppError::not_found("School not found"));
            }
        }

        Self::create_request(
            db,
            &dto.full_name,
            &dto.email,
            &dto.password,
            &dto.role,
            dto.school_id,
        )
        .await
    }

    async fn create_request(
        db: &PgPool,
        full_name: &str,
        email: &str,
        password: &str,
        role: &str,
        school_id: Option<Uuid>,
    ) -> Result<RegistrationRequest, AppError> {
        let requested_role = UserRole::parse(role)
            .filter(|r| SELF_REGISTER_ROLES.contains(r))
            .ok_or_else(|| AppError::bad_request(format!("Role {role} cannot be requested")))?;

        let email_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(db)
                .await?;
        if email_taken > 0 {
            return Err(AppError::bad_request("User with this email already exists"));
        }

        // Passwords are hashed before the request is stored; the plaintext
        // never reaches the database.
        let hashed_password = hash_password(password)?;

        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            "INSERT INTO register_requests (full_name, email, password, role, status, school_id)
             VALUES ($1, $2, $3, $4, 'pending', $5)
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(full_name)
        .bind(email)
        .bind(&hashed_password)
        .bind(requested_role.as_str())
        .bind(school_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request("Request with this email already exists");
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        info!(email, role = requested_role.as_str(), "registration request submitted");
        Ok(request)
    }

    /// Pending requests visible to an admin. School admins see their own
    /// school; superadmins (no school scope) see everything.
    #[instrument(skip(db))]
    pub async fn pending_requests(
        db: &PgPool,
        school_scope: Option<Uuid>,
    ) -> Result<Vec<RegistrationRequest>, AppError> {
        let requests = match school_scope {
            Some(school_id) => {
                sqlx::query_as::<_, RegistrationRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS}
                     FROM register_requests
                     WHERE status = 'pending' AND school_id = $1
                     ORDER BY created_at",
                ))
                .bind(school_id)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, RegistrationRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS}
                     FROM register_requests
                     WHERE status = 'pending'
                     ORDER BY created_at",
                ))
                .fetch_all(db)
                .await?
            }
        };

        Ok(requests)
    }

    /// Approves a pending request, creating the user from the stored hash.
    /// User insert and status flip share one transaction.
    #[instrument(skip(db))]
    pub async fn approve(
        db: &PgPool,
        request_id: Uuid,
        school_scope: Option<Uuid>,
    ) -> Result<User, AppError> {
        #[derive(sqlx::FromRow)]
        struct RequestWithPassword {
            full_name: String,
            email: String,
            password: String,
            role: String,
            status: String,
            school_id: Option<Uuid>,
        }

        let mut tx = db.begin().await?;

        let request = sqlx::query_as::<_, RequestWithPassword>(
            "SELECT full_name, email, password, role, status, school_id
             FROM register_requests
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Registration request not found"))?;

        if let Some(scope) = school_scope {
            if request.school_id != Some(scope) {
                return Err(AppError::forbidden(
                    "Request belongs to a different school",
                ));
            }
        }

        if request.status != RequestStatus::Pending.as_str() {
            return Err(AppError::bad_request("Request already processed"));
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (full_name, email, password, role, school_id, is_verified)
             VALUES ($1, $2, $3, $4, $5, TRUE)
             RETURNING id, full_name, email, role, school_id, is_verified, created_at, updated_at",
        )
        .bind(&request.full_name)
        .bind(&request.email)
        .bind(&request.password)
        .bind(&request.role)
        .bind(request.school_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request("User with this email already exists");
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        sqlx::query("UPDATE register_requests SET status = 'approved' WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        track_user_created(&user.role);
        info!(email = %user.email, "registration request approved");
        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn reject(
        db: &PgPool,
        request_id: Uuid,
        school_scope: Option<Uuid>,
    ) -> Result<RegistrationRequest, AppError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM register_requests WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Registration request not found"))?;

        if let Some(scope) = school_scope {
            if request.school_id != Some(scope) {
                return Err(AppError::forbidden(
                    "Request belongs to a different school",
                ));
            }
        }

        if request.status != RequestStatus::Pending.as_str() {
            return Err(AppError::bad_request("Request already processed"));
        }

        let rejected = sqlx::query_as::<_, RegistrationRequest>(&format!(
            "UPDATE register_requests SET status = 'rejected' WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(request_id)
        .fetch_one(db)
        .await?;

        info!(email = %rejected.email, "registration request rejected");
        Ok(rejected)
    }
}
