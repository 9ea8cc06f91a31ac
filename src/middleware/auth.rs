use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
    utils::jwt::decode_jwt,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Authenticated caller, resolved from the bearer token and the users table.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT authentication middleware.
///
/// Verifies the bearer token, loads the user so role changes apply
/// immediately, and stores an [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let claims = decode_jwt(&token).map_err(|_| AppError::Unauthorized)?;

    let user_id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;
    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let role = Role::parse(&user.role).ok_or_else(|| {
        tracing::warn!(user_id, role = %user.role, "User has an unknown role");
        AppError::Forbidden
    })?;

    request.extensions_mut().insert(AuthUser { user_id, role });
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Reject callers whose role is not in `allowed`.
pub fn require_role(auth_user: &AuthUser, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&auth_user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn require_admin(auth_user: &AuthUser) -> AppResult<()> {
    require_role(auth_user, &[Role::Admin])
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
