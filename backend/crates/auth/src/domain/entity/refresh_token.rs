//! Refresh Token Entity
//!
//! One row per issued refresh credential. Only the SHA-256 of the secret is
//! kept. Rows are never rewritten: rotation revokes the old row and inserts a
//! new one, so a revoked or expired row stays dead until the sweep deletes it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::RefreshTokenId;

use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    /// Hex SHA-256 of the plaintext secret
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// New active row expiring `ttl` from now
    pub fn new(user_id: UserId, token_hash: String, ttl: Duration) -> AuthResult<Self> {
        let now = Utc::now();
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|_| AuthError::Internal("Refresh token TTL out of range".into()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal("Refresh token expiry overflow".into()))?;

        Ok(Self {
            id: RefreshTokenId::new(),
            user_id,
            token_hash,
            expires_at,
            revoked: false,
            created_at: now,
        })
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}
