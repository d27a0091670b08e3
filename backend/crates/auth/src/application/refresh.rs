//! Refresh Use Case
//!
//! Trades a valid refresh token for a new pair; the old refresh token is
//! revoked in the same transaction that stores the new one.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::login::TokenPair;
use crate::application::token_service::{TokenService, hash_refresh_secret};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    users: Arc<U>,
    tokens: Arc<T>,
    service: TokenService<T>,
    config: Arc<AuthConfig>,
}

impl<U, T> RefreshUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(users: Arc<U>, tokens: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            service: TokenService::new(tokens.clone(), config.clone()),
            tokens,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: Option<String>) -> AuthResult<TokenPair> {
        let plaintext = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;
        let old_hash = hash_refresh_secret(&plaintext);

        let current = self
            .tokens
            .find_active_by_hash(&old_hash)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        // Role may have changed since login; the new access token carries the
        // current one.
        let user = self
            .users
            .find_by_id(&current.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let refresh = self
            .service
            .rotate_refresh_token(&old_hash, &user.user_id)
            .await?;
        let access_token = self.service.issue_access_token(&user.user_id, user.role)?;

        tracing::debug!(user_id = %user.user_id, "Refresh token rotated");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.plaintext,
            expires_in: self.config.access_ttl_secs(),
        })
    }
}
