//! Repository Traits
//!
//! Interfaces for data persistence and outbound mail. Implementations are in
//! the infrastructure layer.

use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user
    ///
    /// A unique violation on username or email must surface as
    /// `UsernameTaken` / `EmailTaken`, whatever the pre-checks said.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_username(&self, username: &UserName) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// All users, oldest first
    async fn list(&self) -> AuthResult<Vec<User>>;

    /// `UserNotFound` if no row matched, `EmailTaken` on conflict
    async fn update_email(&self, user_id: &UserId, email: &Email) -> AuthResult<()>;

    /// `UserNotFound` if no row matched
    async fn update_role(&self, user_id: &UserId, role: UserRole) -> AuthResult<()>;

    /// Delete the user; refresh tokens and cart rows cascade
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;

    async fn admin_exists(&self) -> AuthResult<bool>;

    /// Replace the password hash and revoke every refresh token of the user
    /// in one transaction. Returns the number of tokens revoked.
    async fn replace_password(&self, user_id: &UserId, password: &UserPassword)
    -> AuthResult<u64>;
}

/// Refresh token ledger
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    async fn insert(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Row with this hash that is neither revoked nor expired
    async fn find_active_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Atomically revoke the active row `old_hash` owned by `user_id` and
    /// insert `replacement`.
    ///
    /// Returns `false` (and changes nothing) when no active row matched,
    /// including when a concurrent rotation of the same token won the race.
    async fn rotate(
        &self,
        old_hash: &str,
        user_id: &UserId,
        replacement: &RefreshToken,
    ) -> AuthResult<bool>;

    /// Revoke one token. Unknown or already revoked hashes are not an error.
    async fn revoke_by_hash(&self, token_hash: &str) -> AuthResult<u64>;

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Delete rows that are expired or revoked
    async fn sweep(&self) -> AuthResult<u64>;
}

/// Outbound delivery of password reset links
#[trait_variant::make(ResetNotifier: Send)]
pub trait LocalResetNotifier {
    async fn send_reset_email(&self, email: &Email, reset_token: &str) -> AuthResult<()>;
}
