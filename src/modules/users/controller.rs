use axum::{Json, extract::State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::{User, UserRole, UserSummary};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user_id = auth_user.user_id()?;
    let user = UserService::get_user(&state.db, user_id).await?;
    Ok(Json(user))
}

/// List students visible to the authenticated teacher
#[utoipa::path(
    get,
    path = "/api/users/students",
    responses(
        (status = 200, description = "Students of the teacher's school, or linked students for independent teachers", body = [UserSummary]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    check_role(&auth_user, UserRole::Teacher)?;
    let teacher_id = auth_user.user_id()?;

    let students =
        UserService::students_for_teacher(&state.db, teacher_id, auth_user.school_id()).await?;
    Ok(Json(students))
}
