//! Application Layer
//!
//! Use cases and application services.

pub mod account;
pub mod bootstrap_admin;
pub mod config;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod reset_password;
pub mod sweep;
pub mod token_service;

// Re-exports
pub use account::AccountUseCase;
pub use bootstrap_admin::{AdminSeed, BootstrapAdminUseCase};
pub use config::AuthConfig;
pub use forgot_password::ForgotPasswordUseCase;
pub use login::{LoginInput, LoginUseCase, TokenPair};
pub use logout::LogoutUseCase;
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use reset_password::ResetPasswordUseCase;
pub use sweep::{spawn_refresh_token_sweep, sweep_once};
pub use token_service::TokenService;
