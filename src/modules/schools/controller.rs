use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::schools::model::{
    CreateSchoolAdminDto, CreateSchoolDto, School, SchoolAdminResponse, VerifySchoolCodeDto,
};
use crate::modules::schools::service::SchoolService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a school
#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = CreateSchoolDto,
    responses(
        (status = 201, description = "School created", body = School),
        (status = 400, description = "Name or code already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Superadmin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schools"
)]
#[instrument(skip(state, dto))]
pub async fn create_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSchoolDto>,
) -> Result<(StatusCode, Json<School>), AppError> {
    check_role(&auth_user, UserRole::Superadmin)?;

    let school = SchoolService::create_school(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

/// List all schools
#[utoipa::path(
    get,
    path = "/api/schools",
    responses(
        (status = 200, description = "All schools, ordered by name", body = [School]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn get_all_schools(State(state): State<AppState>) -> Result<Json<Vec<School>>, AppError> {
    let schools = SchoolService::get_all_schools(&state.db).await?;
    Ok(Json(schools))
}

/// Verify a school code before registration
#[utoipa::path(
    post,
    path = "/api/schools/verify-code",
    request_body = VerifySchoolCodeDto,
    responses(
        (status = 200, description = "School matching the code", body = School),
        (status = 404, description = "No school with this code", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn verify_school_code(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerifySchoolCodeDto>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::find_by_code(&state.db, &dto.code).await?;
    Ok(Json(school))
}

/// Create a school admin for a school
#[utoipa::path(
    post,
    path = "/api/schools/{id}/admins",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    request_body = CreateSchoolAdminDto,
    responses(
        (status = 201, description = "School admin created", body = SchoolAdminResponse),
        (status = 400, description = "Email already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Superadmin only", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schools"
)]
#[instrument(skip(state, dto))]
pub async fn create_school_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateSchoolAdminDto>,
) -> Result<(StatusCode, Json<SchoolAdminResponse>), AppError> {
    check_role(&auth_user, UserRole::Superadmin)?;

    let admin = SchoolService::create_school_admin(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}
