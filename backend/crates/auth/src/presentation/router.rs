//! Auth Routers
//!
//! Three routers share one [`AuthAppState`]; the binary nests them under
//! `/auth`, `/users` and `/admin/users`.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::domain::repository::{RefreshTokenRepository, ResetNotifier, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_access_token, require_role};

/// Public credential endpoints
pub fn auth_router<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(handlers::register::<R, N>))
        .route("/login", post(handlers::login::<R, N>))
        .route("/refresh-token", post(handlers::refresh_token::<R, N>))
        .route("/logout", post(handlers::logout::<R, N>))
        .route("/forgot-password", post(handlers::forgot_password::<R, N>))
        .route("/reset-password/{token}", post(handlers::reset_password::<R, N>))
        .with_state(state)
}

/// `/me`, any authenticated user
pub fn account_router<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let guard = state.guard();

    Router::new()
        .route("/me", get(handlers::me).put(handlers::update_me::<R, N>))
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_access_token::<R>,
        ))
        .with_state(state)
}

/// User administration, admin role only
pub fn admin_users_router<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
    N: ResetNotifier + Send + Sync + 'static,
{
    let guard = state.guard();

    // Last layer added runs first: token check, then role check.
    Router::new()
        .route("/", get(handlers::list_users::<R, N>))
        .route("/{id}", delete(handlers::delete_user::<R, N>))
        .route("/{id}/role", put(handlers::update_role::<R, N>))
        .route_layer(middleware::from_fn_with_state(UserRole::Admin, require_role))
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_access_token::<R>,
        ))
        .with_state(state)
}
