//! Presentation Layer
//!
//! HTTP handlers, DTOs, routers, and the access gate middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{AccessGuard, Principal, require_access_token, require_role};
pub use router::{account_router, admin_users_router, auth_router};
