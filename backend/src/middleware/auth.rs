//! Authentication middleware
//!
//! Validates the bearer token and puts an explicit `AuthUser` into the
//! request extensions. Handlers read it back through `CurrentUser`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::models::MemberRole;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::decode_access_token;
use crate::AppState;

/// Authenticated session attached to a request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub role: MemberRole,
}

impl AuthUser {
    /// Owners and admins only
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role.can_manage_settings() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Authentication middleware that validates JWT access tokens
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = match bearer_token(request.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok())) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized("Falta el encabezado Authorization".to_string()).into_response();
        }
    };

    let claims = match decode_access_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return AppError::InvalidToken.into_response(),
    };

    let org_id = match Uuid::parse_str(&claims.org_id) {
        Ok(id) => id,
        Err(_) => return AppError::InvalidToken.into_response(),
    };

    let role = match claims.role.parse::<MemberRole>() {
        Ok(role) => role,
        Err(_) => return AppError::InvalidToken.into_response(),
    };

    request.extensions_mut().insert(AuthUser { user_id, org_id, role });

    next.run(request).await
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for the authenticated user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Debes iniciar sesión".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_only_managers_pass() {
        let mut user = AuthUser {
            user_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            role: MemberRole::Member,
        };
        assert!(user.require_manager().is_err());
        user.role = MemberRole::Admin;
        assert!(user.require_manager().is_ok());
    }
}
