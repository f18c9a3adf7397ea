use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::Claims;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the Bearer token and exposes the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The user ID from the token subject.
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// The caller's role, rejecting tokens carrying an unknown role string.
    pub fn role(&self) -> Result<UserRole, AppError> {
        UserRole::parse(&self.0.role)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Invalid role: {}", self.0.role)))
    }

    /// The caller's school scope (`None` for superadmins and independents).
    pub fn school_id(&self) -> Option<uuid::Uuid> {
        self.0.school_id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims_for(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: role.to_string(),
            school_id: None,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn user_id_parses_token_subject() {
        let id = Uuid::new_v4();
        let mut claims = claims_for("student");
        claims.sub = id.to_string();
        assert_eq!(AuthUser(claims).user_id().unwrap(), id);
    }

    #[test]
    fn user_id_rejects_garbage_subject() {
        let mut claims = claims_for("student");
        claims.sub = "not-a-uuid".to_string();
        assert!(AuthUser(claims).user_id().is_err());
    }

    #[test]
    fn role_parses_known_roles() {
        assert_eq!(
            AuthUser(claims_for("teacher")).role().unwrap(),
            UserRole::Teacher
        );
        assert!(AuthUser(claims_for("principal")).role().is_err());
    }

    #[test]
    fn school_id_passthrough() {
        let school = Uuid::new_v4();
        let mut claims = claims_for("school_admin");
        claims.school_id = Some(school);
        assert_eq!(AuthUser(claims).school_id(), Some(school));
    }
}
