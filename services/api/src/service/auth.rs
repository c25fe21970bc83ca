//! Account registration, login and token resolution

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::{JwtService, TokenError},
    models::{
        AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserResponse,
        UserSummary,
    },
    password::{hash_password, verify_password},
    rate_limiter::RateLimiter,
    repositories::{USERS_EMAIL_KEY, UserRepository},
    validation::{normalize_email, validate_email, validate_name, validate_password},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "User already exists with this email";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    limiter: RateLimiter,
}

/// Treat empty strings like missing fields
fn provided(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtService, limiter: RateLimiter) -> Self {
        Self {
            users,
            jwt,
            limiter,
        }
    }

    /// Create an account and sign the new user in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        let (Some(name), Some(email), Some(password)) = (
            provided(request.name),
            provided(request.email),
            provided(request.password),
        ) else {
            return Err(ApiError::Validation(
                "Please provide name, email, and password".to_string(),
            ));
        };

        let name = name.trim().to_string();
        let email = normalize_email(&email);

        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Ok(Role::default()),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| "Role must be either student or admin".to_string()),
        };

        let errors: Vec<String> = [
            validate_name(&name),
            validate_email(&email),
            validate_password(&password),
            role.as_ref().map(|_| ()).map_err(Clone::clone),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        let role = match role {
            Ok(role) if errors.is_empty() => role,
            _ => return Err(ApiError::InvalidInput(errors)),
        };

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(password).await.map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::Internal("Failed to process password".to_string())
        })?;

        let user = self
            .users
            .create(&NewUser {
                name,
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                e if e.is_unique_violation_on(USERS_EMAIL_KEY) => {
                    ApiError::Conflict(EMAIL_TAKEN.to_string())
                }
                e => ApiError::from(e),
            })?;

        info!("Registered {} account {}", user.role, user.id);
        self.respond_with_token(&user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let (Some(email), Some(password)) = (provided(request.email), provided(request.password))
        else {
            return Err(ApiError::Validation(
                "Please provide email and password".to_string(),
            ));
        };

        let email = normalize_email(&email);

        if !self.limiter.is_allowed(&email).await {
            return Err(ApiError::TooManyRequests(
                "Too many login attempts. Please try again later.".to_string(),
            ));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.limiter.record_failure(&email).await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let matches = verify_password(password, user.password_hash.clone())
            .await
            .map_err(|e| {
                error!("Failed to verify password for {}: {}", user.id, e);
                ApiError::Internal("Failed to verify credentials".to_string())
            })?;

        if !matches {
            warn!("Failed login for {}", email);
            self.limiter.record_failure(&email).await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.limiter.reset(&email).await;
        info!("User {} logged in", user.id);
        self.respond_with_token(&user)
    }

    /// Resolve a bearer token to the stored user
    pub async fn authenticate(&self, token: &str) -> ApiResult<User> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            TokenError::Expired => ApiError::Unauthorized("Token expired.".to_string()),
            TokenError::Invalid => ApiError::Unauthorized("Invalid token.".to_string()),
        })?;

        self.users
            .find_by_id(claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token. User not found.".to_string()))
    }

    /// Every account, newest first
    pub async fn list_users(&self) -> ApiResult<Vec<UserResponse>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    fn respond_with_token(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self.jwt.issue(user.id).map_err(|e| {
            error!("Failed to issue token: {}", e);
            ApiError::Internal("Failed to issue token".to_string())
        })?;

        Ok(AuthResponse {
            user: UserSummary::from(user),
            token,
        })
    }
}

#[cfg(test)]
impl AuthService {
    pub(crate) fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
