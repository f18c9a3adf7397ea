use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::disciplines::model::{
    AssignDisciplineDto, CreateDisciplineDto, Discipline, TeacherDiscipline,
    TeacherDisciplineView,
};
use crate::modules::disciplines::service::DisciplineService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

fn school_admin_scope(auth_user: &AuthUser) -> Result<(Uuid, Uuid), AppError> {
    check_role(auth_user, UserRole::SchoolAdmin)?;
    let admin_id = auth_user.user_id()?;
    let school_id = auth_user
        .school_id()
        .ok_or_else(|| AppError::forbidden("School admin must be assigned to a school"))?;
    Ok((admin_id, school_id))
}

/// Create a discipline in the admin's school
#[utoipa::path(
    post,
    path = "/api/disciplines",
    request_body = CreateDisciplineDto,
    responses(
        (status = 201, description = "Discipline created", body = Discipline),
        (status = 400, description = "Duplicate subject/grade", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - School admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Disciplines"
)]
#[instrument(skip(state, dto))]
pub async fn create_discipline(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDisciplineDto>,
) -> Result<(StatusCode, Json<Discipline>), AppError> {
    let (_, school_id) = school_admin_scope(&auth_user)?;

    let discipline = DisciplineService::create_discipline(&state.db, school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(discipline)))
}

/// List the admin's school disciplines
#[utoipa::path(
    get,
    path = "/api/disciplines",
    responses(
        (status = 200, description = "Disciplines ordered by subject and grade", body = [Discipline]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - School admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Disciplines"
)]
#[instrument(skip(state))]
pub async fn get_school_disciplines(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Discipline>>, AppError> {
    let (_, school_id) = school_admin_scope(&auth_user)?;

    let disciplines = DisciplineService::school_disciplines(&state.db, school_id).await?;
    Ok(Json(disciplines))
}

/// Assign a discipline to a teacher
#[utoipa::path(
    post,
    path = "/api/disciplines/{id}/assign",
    params(
        ("id" = Uuid, Path, description = "Discipline ID")
    ),
    request_body = AssignDisciplineDto,
    responses(
        (status = 201, description = "Assignment created or reactivated", body = TeacherDiscipline),
        (status = 400, description = "Already assigned, or user is not a teacher", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - School admin of the same school only", body = ErrorResponse),
        (status = 404, description = "Discipline or teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Disciplines"
)]
#[instrument(skip(state))]
pub async fn assign_discipline(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<AssignDisciplineDto>,
) -> Result<(StatusCode, Json<TeacherDiscipline>), AppError> {
    let (admin_id, school_id) = school_admin_scope(&auth_user)?;

    let assignment =
        DisciplineService::assign_to_teacher(&state.db, id, dto.teacher_id, admin_id, school_id)
            .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Remove a discipline from a teacher (soft delete)
#[utoipa::path(
    delete,
    path = "/api/disciplines/{id}/assign/{teacher_id}",
    params(
        ("id" = Uuid, Path, description = "Discipline ID"),
        ("teacher_id" = Uuid, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Assignment deactivated"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - School admin of the same school only", body = ErrorResponse),
        (status = 404, description = "Discipline or assignment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Disciplines"
)]
#[instrument(skip(state))]
pub async fn unassign_discipline(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (_, school_id) = school_admin_scope(&auth_user)?;

    DisciplineService::unassign_from_teacher(&state.db, id, teacher_id, school_id).await?;
    Ok(Json(json!({"message": "Assignment removed"})))
}

/// List the authenticated teacher's active disciplines
#[utoipa::path(
    get,
    path = "/api/disciplines/my",
    responses(
        (status = 200, description = "Active assignments", body = [TeacherDisciplineView]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Disciplines"
)]
#[instrument(skip(state))]
pub async fn my_disciplines(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<TeacherDisciplineView>>, AppError> {
    check_role(&auth_user, UserRole::Teacher)?;
    let teacher_id = auth_user.user_id()?;

    let disciplines = DisciplineService::teacher_disciplines(&state.db, teacher_id).await?;
    Ok(Json(disciplines))
}
