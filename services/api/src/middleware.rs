//! Authentication middleware and role-gated extractors
//!
//! `auth_middleware` resolves the bearer token to a stored user and puts it
//! in the request extensions. Handlers then pick one of the extractors below;
//! the role check happens before any body is read.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use crate::{
    error::ApiError,
    models::{Role, User},
    state::AppState,
};

/// Resolve `Authorization: Bearer <token>` to a user, or answer 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(ApiError::Unauthorized(
            "Access denied. No token provided.".to_string(),
        ));
    };

    let user = state.auth.authenticate(bearer.token()).await?;
    debug!("Authenticated {} as {}", user.id, user.role);

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticated user holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Authenticated user holding the student role
#[derive(Debug, Clone)]
pub struct StudentUser(pub User);

fn current_user(parts: &Parts) -> Result<User, ApiError> {
    parts
        .extensions
        .get::<CurrentUser>()
        .map(|current| current.0.clone())
        .ok_or_else(|| ApiError::Unauthorized("Access denied. No token provided.".to_string()))
}

fn require(user: User, allowed: &[Role]) -> Result<User, ApiError> {
    if allowed.contains(&user.role) {
        return Ok(user);
    }

    let required: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(ApiError::Forbidden(format!(
        "Access denied. Required role: {}",
        required.join(" or ")
    )))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).map(CurrentUser)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(current_user(parts)?, &[Role::Admin]).map(AdminUser)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for StudentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(current_user(parts)?, &[Role::Student]).map(StudentUser)
    }
}
