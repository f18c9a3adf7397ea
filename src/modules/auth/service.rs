use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::metrics::{track_jwt_issued, track_user_login_failure, track_user_login_success};
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;

use super::model::{LoginRequest, LoginResponse};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            full_name: String,
            email: String,
            password: String,
            role: String,
            school_id: Option<Uuid>,
        }

        let user = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, full_name, email, password, role, school_id
             FROM users
             WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            track_user_login_failure("unknown_email");
            AppError::unauthorized("Invalid email or password")
        })?;

        let is_valid = verify_password(&dto.password, &user.password)?;
        if !is_valid {
            track_user_login_failure("bad_password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let role = UserRole::parse(&user.role)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Invalid role: {}", user.role)))?;

        let access_token =
            create_access_token(user.id, &user.email, &role, user.school_id, jwt_config)?;

        track_user_login_success(role.as_str());
        track_jwt_issued();

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            role: user.role,
            email: user.email,
            full_name: user.full_name,
            school_id: user.school_id,
        })
    }
}
