//! Logout Use Case

use std::sync::Arc;

use crate::application::token_service::hash_refresh_secret;
use crate::domain::repository::RefreshTokenRepository;
use crate::error::{AuthError, AuthResult};

pub struct LogoutUseCase<T>
where
    T: RefreshTokenRepository,
{
    tokens: Arc<T>,
}

impl<T> LogoutUseCase<T>
where
    T: RefreshTokenRepository,
{
    pub fn new(tokens: Arc<T>) -> Self {
        Self { tokens }
    }

    /// Revoke the given refresh token
    ///
    /// Unknown or already revoked tokens still succeed; only a missing token
    /// is an error.
    pub async fn execute(&self, refresh_token: Option<String>) -> AuthResult<()> {
        let plaintext = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let revoked = self
            .tokens
            .revoke_by_hash(&hash_refresh_secret(&plaintext))
            .await?;

        tracing::debug!(revoked, "Logout");

        Ok(())
    }
}
