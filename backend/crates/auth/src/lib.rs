//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, token service, configuration
//! - `infra/` - PostgreSQL repository and reset mail notifier
//! - `presentation/` - HTTP handlers, DTOs, routers, access gate
//!
//! ## Features
//! - Registration and login with username + password
//! - Short-lived HS256 access tokens, opaque rotating refresh tokens
//! - Logout, forgot/reset password by emailed link
//! - Role-based access (User, Admin) and admin user management
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async runtime
//! - Refresh tokens stored only as SHA-256; each rotation is single-use
//! - Unknown user and wrong password are indistinguishable to clients
//! - Password reset revokes every refresh token of the account

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{AdminSeed, BootstrapAdminUseCase, spawn_refresh_token_sweep, sweep_once};
pub use error::{AuthError, AuthResult};
pub use infra::{PgAuthRepository, ResetMailNotifier};
pub use presentation::{
    AccessGuard, AuthAppState, Principal, account_router, admin_users_router, auth_router,
    require_access_token, require_role,
};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
