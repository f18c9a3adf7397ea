//! Role-based authorization for Axum routes.
//!
//! Two patterns are available: a route layer built with
//! `middleware::from_fn_with_state` for routers with a uniform role
//! requirement, and `check_role`/`check_any_role` helpers for controllers
//! with mixed requirements.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Checks that the authenticated caller holds one of the allowed roles.
pub async fn require_roles(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}, but user has role: {:?}",
            allowed_roles, user_role
        )));
    }

    req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

pub async fn require_superadmin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Superadmin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_school_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::SchoolAdmin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// School admins and superadmins.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::Superadmin, UserRole::SchoolAdmin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// In-controller check for a single required role.
pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    let user_role = auth_user.role()?;

    if user_role != required_role {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {:?}, but user has role: {:?}",
            required_role, user_role
        )));
    }

    Ok(())
}

/// In-controller check accepting any of the listed roles.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}, but user has role: {:?}",
            allowed_roles, user_role
        )));
    }

    Ok(())
}

/// Hierarchy level of a role (higher number = more privileges).
pub fn role_hierarchy_level(role: &UserRole) -> u8 {
    match role {
        UserRole::Superadmin => 4,
        UserRole::SchoolAdmin => 3,
        UserRole::Teacher => 2,
        UserRole::Parent => 1,
        UserRole::Student => 0,
    }
}
