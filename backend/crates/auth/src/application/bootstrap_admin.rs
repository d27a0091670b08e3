//! Admin bootstrap
//!
//! Creates the first admin account at startup. Idempotent: does nothing
//! once any admin exists.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::RawPassword, user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub struct BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// `true` if an admin was created
    pub async fn execute(&self, seed: AdminSeed) -> AuthResult<bool> {
        if self.users.admin_exists().await? {
            return Ok(false);
        }

        let username = UserName::new(&seed.username)?;
        let email = Email::new(&seed.email)?;
        let password_hash = UserPassword::hash(RawPassword::new(seed.password)?).await?;
        let admin = User::new(username, email, password_hash, UserRole::Admin);

        match self.users.create(&admin).await {
            Ok(()) => {
                tracing::info!(user_id = %admin.user_id, "Admin account created");
                Ok(true)
            }
            Err(AuthError::UsernameTaken | AuthError::EmailTaken) => {
                tracing::warn!("Admin bootstrap skipped: username or email already in use");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
