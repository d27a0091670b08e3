//! Register Use Case
//!
//! Creates a `user`-role account.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::RawPassword,
    user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email = Email::new(&input.email)?;
        let username = UserName::new(&input.username)?;
        let password = RawPassword::new(input.password)?;

        // Fast path only: the unique constraints decide, see `create`.
        let (name_taken, email_taken) = tokio::join!(
            self.users.exists_by_username(&username),
            self.users.exists_by_email(&email)
        );
        if name_taken? {
            return Err(AuthError::UsernameTaken);
        }
        if email_taken? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = UserPassword::hash(password).await?;
        let user = User::new(username, email, password_hash, UserRole::User);

        self.users.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(RegisterOutput {
            user_id: user.user_id,
            username: user.username.into(),
            email: user.email.into_db(),
        })
    }
}
