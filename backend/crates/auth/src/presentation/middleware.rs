//! Access Guard
//!
//! `require_access_token` verifies the bearer access token and attaches the
//! caller as a [`Principal`]; `require_role` runs after it and checks the
//! role. Every rejection from the token gate is the same 401.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::config::AuthConfig;
use crate::application::token_service::verify_access_token;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::AuthError;

/// Authenticated caller, available to handlers behind the access gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role,
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

/// Middleware state
pub struct AccessGuard<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub config: Arc<AuthConfig>,
}

impl<U> AccessGuard<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { users, config }
    }
}

impl<U> Clone for AccessGuard<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            config: self.config.clone(),
        }
    }
}

/// `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that requires a valid access token
///
/// The user row is reloaded so a deleted account or a changed role takes
/// effect before the token expires.
pub async fn require_access_token<U>(
    State(guard): State<AccessGuard<U>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthorized)?;

    let claims = verify_access_token(&guard.config, token).map_err(|e| {
        tracing::debug!(reason = %e, "Access token rejected");
        AuthError::Unauthorized
    })?;

    let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::Unauthorized)?;
    let user = guard
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    req.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(req).await)
}

/// Middleware that requires the principal to hold `role`
///
/// Use with `from_fn_with_state(UserRole::Admin, require_role)`, layered
/// inside `require_access_token`.
pub async fn require_role(
    State(role): State<UserRole>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(AuthError::Unauthorized)?;

    if principal.role != role {
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(req).await)
}
