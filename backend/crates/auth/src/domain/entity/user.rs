//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
    user_role::UserRole,
};

/// User entity
///
/// `password_hash` never leaves the crate through a DTO; presentation maps
/// users through `Principal` / `UserResponse`, which have no hash field.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, used for login
    pub username: UserName,
    /// Unique, receives password reset links
    pub email: Email,
    pub password_hash: UserPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: UserName, email: Email, password_hash: UserPassword, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            username,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
