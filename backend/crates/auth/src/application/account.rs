//! Account management
//!
//! Profile updates for the signed-in user and the admin user listing.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

pub struct AccountUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> AccountUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn profile(&self, user_id: &UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update_email(&self, user_id: &UserId, email: &str) -> AuthResult<User> {
        let email = Email::new(email)?;
        self.users.update_email(user_id, &email).await?;
        tracing::info!(user_id = %user_id, "Email updated");
        self.profile(user_id).await
    }

    pub async fn list_users(&self) -> AuthResult<Vec<User>> {
        self.users.list().await
    }

    pub async fn delete_user(&self, actor: &UserId, user_id: &UserId) -> AuthResult<()> {
        self.users.delete(user_id).await?;
        tracing::info!(actor = %actor, user_id = %user_id, "User deleted");
        Ok(())
    }

    pub async fn change_role(&self, actor: &UserId, user_id: &UserId, role: &str) -> AuthResult<User> {
        let role = UserRole::from_code(role)
            .ok_or_else(|| AuthError::Validation("Role must be 'user' or 'admin'".into()))?;
        self.users.update_role(user_id, role).await?;
        tracing::info!(actor = %actor, user_id = %user_id, role = %role, "Role changed");
        self.profile(user_id).await
    }
}
