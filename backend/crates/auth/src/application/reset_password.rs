//! Reset Password Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_service::verify_reset_token;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_password::RawPassword, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

pub struct ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { users, config }
    }

    /// Replace the password of the account the reset token was issued for
    ///
    /// Any refresh token still alive is revoked with the same write. The
    /// caller is not logged in.
    pub async fn execute(&self, reset_token: &str, new_password: String) -> AuthResult<()> {
        let email = verify_reset_token(&self.config, reset_token)?;
        let email = Email::new(email).map_err(|_| AuthError::Unauthorized)?;

        let password = RawPassword::new(new_password)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let password_hash = UserPassword::hash(password).await?;
        let revoked = self
            .users
            .replace_password(&user.user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user.user_id, revoked, "Password reset completed");

        Ok(())
    }
}
