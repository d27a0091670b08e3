//! Forgot Password Use Case
//!
//! Returns the same outcome for known and unknown usernames. For a known
//! user every refresh token is revoked before the reset link is sent.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_service::issue_reset_token;
use crate::domain::repository::{RefreshTokenRepository, ResetNotifier, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::AuthResult;

pub struct ForgotPasswordUseCase<U, T, N>
where
    U: UserRepository,
    T: RefreshTokenRepository,
    N: ResetNotifier + Send + Sync + 'static,
{
    users: Arc<U>,
    tokens: Arc<T>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<U, T, N> ForgotPasswordUseCase<U, T, N>
where
    U: UserRepository,
    T: RefreshTokenRepository,
    N: ResetNotifier + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, tokens: Arc<T>, notifier: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            tokens,
            notifier,
            config,
        }
    }

    /// Mail delivery runs detached; its failure is logged and never reaches
    /// the caller. Store failures do propagate.
    pub async fn execute(&self, username: &str) -> AuthResult<()> {
        // A name that fails validation cannot belong to an account.
        let Ok(username) = UserName::new(username) else {
            return Ok(());
        };

        let Some(user) = self.users.find_by_username(&username).await? else {
            tracing::debug!("Password reset requested for unknown username");
            return Ok(());
        };

        let revoked = self.tokens.revoke_all_for_user(&user.user_id).await?;
        let reset_token = issue_reset_token(&self.config, &user.email)?;

        tracing::info!(user_id = %user.user_id, revoked, "Password reset requested");

        let notifier = self.notifier.clone();
        let email = user.email;
        let user_id = user.user_id;
        tokio::spawn(async move {
            if let Err(e) = notifier.send_reset_email(&email, &reset_token).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to deliver password reset email");
            }
        });

        Ok(())
    }
}
