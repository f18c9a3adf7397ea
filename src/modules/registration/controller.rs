use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::registration::model::{
    CreateRegistrationDto, IndependentRegistrationDto, RegistrationRequest,
};
use crate::modules::registration::service::RegistrationService;
use crate::modules::users::model::{User, UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// School-scoping for request listing/decisions: school admins operate on
/// their own school, superadmins on everything.
fn admin_scope(auth_user: &AuthUser) -> Result<Option<Uuid>, AppError> {
    match auth_user.role()? {
        UserRole::Superadmin => Ok(None),
        UserRole::SchoolAdmin => {
            let school_id = auth_user.school_id().ok_or_else(|| {
                AppError::forbidden("School admin must be assigned to a school")
            })?;
            Ok(Some(school_id))
        }
        // The route layer already rejects other roles; this is a backstop.
        _ => Err(AppError::forbidden("Administrator privileges required")),
    }
}

/// Submit a school-bound registration request
#[utoipa::path(
    post,
    path = "/api/registration/register",
    request_body = CreateRegistrationDto,
    responses(
        (status = 201, description = "Request submitted", body = RegistrationRequest),
        (status = 400, description = "Email taken or role not allowed", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Registration"
)]
#[instrument(skip(state, dto))]
pub async fn submit_registration(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateRegistrationDto>,
) -> Result<(StatusCode, Json<RegistrationRequest>), AppError> {
    let request = RegistrationService::submit(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Submit an independent registration request (no school)
#[utoipa::path(
    post,
    path = "/api/registration/register/independent",
    request_body = IndependentRegistrationDto,
    responses(
        (status = 201, description = "Request submitted", body = RegistrationRequest),
        (status = 400, description = "Email taken or role not allowed", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Registration"
)]
#[instrument(skip(state, dto))]
pub async fn submit_independent_registration(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<IndependentRegistrationDto>,
) -> Result<(StatusCode, Json<RegistrationRequest>), AppError> {
    let request = RegistrationService::submit_independent(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List pending registration requests
#[utoipa::path(
    get,
    path = "/api/registration/requests",
    responses(
        (status = 200, description = "Pending requests in the caller's scope", body = [RegistrationRequest]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registration"
)]
#[instrument(skip(state))]
pub async fn list_pending_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<RegistrationRequest>>, AppError> {
    let scope = admin_scope(&auth_user)?;
    let requests = RegistrationService::pending_requests(&state.db, scope).await?;
    Ok(Json(requests))
}

/// Approve a registration request and create the user
#[utoipa::path(
    post,
    path = "/api/registration/requests/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Registration request ID")
    ),
    responses(
        (status = 201, description = "User created from the request", body = User),
        (status = 400, description = "Request already processed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only or wrong school", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registration"
)]
#[instrument(skip(state))]
pub async fn approve_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let scope = admin_scope(&auth_user)?;
    let user = RegistrationService::approve(&state.db, id, scope).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Reject a registration request
#[utoipa::path(
    post,
    path = "/api/registration/requests/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Registration request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RegistrationRequest),
        (status = 400, description = "Request already processed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only or wrong school", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registration"
)]
#[instrument(skip(state))]
pub async fn reject_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RegistrationRequest>, AppError> {
    let scope = admin_scope(&auth_user)?;
    let request = RegistrationService::reject(&state.db, id, scope).await?;
    Ok(Json(request))
}
