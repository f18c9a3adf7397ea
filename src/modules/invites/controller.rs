use axum::{Json, extract::State};
use tracing::instrument;

use crate::metrics::{track_invite_issued, track_invite_redeemed};
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::MessageResponse;
use crate::modules::invites::code::CodeGenerator;
use crate::modules::invites::model::{
    InviteCodeResponse, InviteSummary, LinkedStudent, LinkedTeacher, RedemptionOutcome,
    UseInviteDto,
};
use crate::modules::invites::service::InviteService;
use crate::modules::invites::store::PgInviteStore;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

fn ensure_teacher(auth_user: &AuthUser) -> Result<uuid::Uuid, AppError> {
    if auth_user.role()? != UserRole::Teacher {
        return Err(AppError::forbidden(
            "Only teachers can create or list invites",
        ));
    }
    auth_user.user_id()
}

fn ensure_student(auth_user: &AuthUser) -> Result<uuid::Uuid, AppError> {
    if auth_user.role()? != UserRole::Student {
        return Err(AppError::forbidden("Only students can use invites"));
    }
    auth_user.user_id()
}

/// Issue a new invite code for the authenticated teacher
#[utoipa::path(
    post,
    path = "/api/invites/create",
    responses(
        (status = 200, description = "Invite code created", body = InviteCodeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse),
        (status = 500, description = "Code space exhausted or internal error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Invites"
)]
#[instrument(skip(state))]
pub async fn create_invite(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<InviteCodeResponse>, AppError> {
    let teacher_id = ensure_teacher(&auth_user)?;

    let store = PgInviteStore::new(state.db.clone());
    let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher_id).await?;

    track_invite_issued();
    Ok(Json(invite.into()))
}

/// Redeem an invite code as the authenticated student
#[utoipa::path(
    post,
    path = "/api/invites/use",
    request_body = UseInviteDto,
    responses(
        (status = 200, description = "Linked to the teacher", body = MessageResponse),
        (status = 400, description = "Code expired or already linked", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Student only", body = ErrorResponse),
        (status = 404, description = "Invalid or used code, or student missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Invites"
)]
#[instrument(skip(state))]
pub async fn use_invite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UseInviteDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let student_id = ensure_student(&auth_user)?;

    let store = PgInviteStore::new(state.db.clone());
    let outcome = InviteService::redeem(&store, &dto.code, student_id).await?;

    track_invite_redeemed(outcome.as_str());

    match outcome {
        RedemptionOutcome::Success => Ok(Json(MessageResponse {
            message: "Successfully connected to teacher".to_string(),
        })),
        RedemptionOutcome::Expired => Err(AppError::bad_request("Invite code expired")),
        RedemptionOutcome::StudentNotFound => Err(AppError::not_found("Student not found")),
        RedemptionOutcome::InvalidCode => Err(AppError::not_found("Invalid or used code")),
        RedemptionOutcome::AlreadyLinked => {
            Err(AppError::bad_request("Already connected to this teacher"))
        }
    }
}

/// List the authenticated teacher's invite codes, newest first
#[utoipa::path(
    get,
    path = "/api/invites/mine",
    responses(
        (status = 200, description = "The teacher's invite codes", body = [InviteSummary]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Invites"
)]
#[instrument(skip(state))]
pub async fn my_invites(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<InviteSummary>>, AppError> {
    let teacher_id = ensure_teacher(&auth_user)?;

    let invites = InviteService::invites_for_teacher(&state.db, teacher_id).await?;
    Ok(Json(invites))
}

/// List students linked to the authenticated teacher
#[utoipa::path(
    get,
    path = "/api/invites/students",
    responses(
        (status = 200, description = "Linked students", body = [LinkedStudent]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Teacher only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Invites"
)]
#[instrument(skip(state))]
pub async fn linked_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<LinkedStudent>>, AppError> {
    let teacher_id = ensure_teacher(&auth_user)?;

    let students = InviteService::linked_students(&state.db, teacher_id).await?;
    Ok(Json(students))
}

/// List teachers the authenticated student is linked to
#[utoipa::path(
    get,
    path = "/api/invites/my-teachers",
    responses(
        (status = 200, description = "Linked teachers", body = [LinkedTeacher]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Student only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Invites"
)]
#[instrument(skip(state))]
pub async fn my_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<LinkedTeacher>>, AppError> {
    let student_id = ensure_student(&auth_user)?;

    let teachers = InviteService::linked_teachers(&state.db, student_id).await?;
    Ok(Json(teachers))
}
