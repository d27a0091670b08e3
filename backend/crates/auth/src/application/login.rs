//! Login Use Case
//!
//! Verifies credentials and issues an access + refresh token pair.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_service::TokenService;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Token pair handed to the client after login or refresh
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Login use case
pub struct LoginUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    users: Arc<U>,
    tokens: TokenService<T>,
    config: Arc<AuthConfig>,
}

impl<U, T> LoginUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(users: Arc<U>, tokens: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            tokens: TokenService::new(tokens, config.clone()),
            config,
        }
    }

    /// Unknown username and wrong password both end in `InvalidCredentials`,
    /// after the same amount of hashing work.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<TokenPair> {
        let password = RawPassword::for_verification(input.password);

        let user = match UserName::new(&input.username) {
            Ok(username) => self.users.find_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            UserPassword::verify_dummy(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !user.password_hash.verify_async(password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access_token(&user.user_id, user.role)?;
        let refresh = self.tokens.store_refresh_token(&user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.plaintext,
            expires_in: self.config.access_ttl_secs(),
        })
    }
}
