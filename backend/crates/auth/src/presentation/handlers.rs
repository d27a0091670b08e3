//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountUseCase, ForgotPasswordUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    RefreshUseCase, RegisterInput, RegisterUseCase, ResetPasswordUseCase,
};
use crate::domain::repository::{RefreshTokenRepository, ResetNotifier, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, TokenResponse, UpdateProfileRequest,
    UpdateRoleRequest, UserResponse,
};
use crate::presentation::middleware::{AccessGuard, Principal};

/// Shared state for auth handlers
pub struct AuthAppState<R, N>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub config: Arc<AuthConfig>,
}

impl<R, N> AuthAppState<R, N>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, notifier: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    /// Access gate sharing this state's repository and config
    pub fn guard(&self) -> AccessGuard<R> {
        AccessGuard::new(self.repo.clone(), self.config.clone())
    }
}

// derive(Clone) would require R: Clone and N: Clone
impl<R, N> Clone for AuthAppState<R, N>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /auth/register
pub async fn register<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone());

    let output = use_case
        .execute(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: output.user_id.to_string(),
            username: output.username,
            email: output.email,
        }),
    ))
}

/// POST /auth/login
pub async fn login<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let pair = use_case
        .execute(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(pair.into()))
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// POST /auth/refresh-token
pub async fn refresh_token<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let pair = use_case.execute(req.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// POST /auth/logout
pub async fn logout<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    LogoutUseCase::new(state.repo.clone())
        .execute(req.refresh_token)
        .await?;

    Ok(Json(MessageResponse {
        message: "Successfully logged out",
    }))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /auth/forgot-password
///
/// Same response whether or not the username exists.
pub async fn forgot_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.username).await?;

    Ok(Json(MessageResponse {
        message: "If the username exists, a reset link has been sent to its associated email",
    }))
}

/// POST /auth/reset-password/{token}
pub async fn reset_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    ResetPasswordUseCase::new(state.repo.clone(), state.config.clone())
        .execute(&token, req.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

// ============================================================================
// Account (access token required)
// ============================================================================

/// GET /users/me
pub async fn me(principal: Principal) -> Json<UserResponse> {
    Json(principal.into())
}

/// PUT /users/me
pub async fn update_me<R, N>(
    State(state): State<AuthAppState<R, N>>,
    principal: Principal,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let user = AccountUseCase::new(state.repo.clone())
        .update_email(&principal.id, &req.email)
        .await?;
    Ok(Json(user.into()))
}

// ============================================================================
// Admin (access token + admin role required)
// ============================================================================

/// GET /admin/users
pub async fn list_users<R, N>(
    State(state): State<AuthAppState<R, N>>,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let users = AccountUseCase::new(state.repo.clone()).list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// DELETE /admin/users/{id}
pub async fn delete_user<R, N>(
    State(state): State<AuthAppState<R, N>>,
    principal: Principal,
    Path(id): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let user_id = parse_user_id(&id)?;
    AccountUseCase::new(state.repo.clone())
        .delete_user(&principal.id, &user_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

/// PUT /admin/users/{id}/role
pub async fn update_role<R, N>(
    State(state): State<AuthAppState<R, N>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let user_id = parse_user_id(&id)?;
    let user = AccountUseCase::new(state.repo.clone())
        .change_role(&principal.id, &user_id, &req.role)
        .await?;
    Ok(Json(user.into()))
}

/// Malformed ids cannot name an existing user
fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    raw.parse().map_err(|_| AuthError::UserNotFound)
}
