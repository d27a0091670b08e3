//! User Password Value Object
//!
//! Domain wrapper over `platform::password`. Hashing and verification are
//! Argon2id and CPU-bound, so the async entry points move the work onto
//! tokio's blocking pool.

use std::fmt;
use std::sync::OnceLock;

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a password that is about to be stored
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooLong { max, .. } => {
                AuthError::Validation(format!("Password must be at most {max} characters"))
            }
            PasswordPolicyError::EmptyOrWhitespace => {
                AuthError::Validation("Password is required".into())
            }
            PasswordPolicyError::InvalidCharacter => {
                AuthError::Validation("Password contains invalid characters".into())
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a login attempt without policy checks
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string as stored in `users.password_hash`
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash on the blocking pool
    pub async fn hash(raw: RawPassword) -> AuthResult<Self> {
        tokio::task::spawn_blocking(move || Self::hash_blocking(&raw)).await?
    }

    pub fn hash_blocking(raw: &RawPassword) -> AuthResult<Self> {
        raw.inner()
            .hash()
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".into()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword) -> bool {
        self.0.verify(raw.inner())
    }

    /// Verify on the blocking pool
    pub async fn verify_async(&self, raw: RawPassword) -> AuthResult<bool> {
        let hash = self.clone();
        let matched = tokio::task::spawn_blocking(move || hash.verify(&raw)).await?;
        Ok(matched)
    }

    /// Burn the same amount of work as a real verification
    ///
    /// Used when the username is unknown so response time does not reveal
    /// whether the account exists.
    pub async fn verify_dummy(raw: RawPassword) -> AuthResult<()> {
        tokio::task::spawn_blocking(move || {
            if let Some(dummy) = dummy_hash() {
                let _ = dummy.verify(&raw);
            }
        })
        .await?;
        Ok(())
    }
}

fn dummy_hash() -> Option<&'static UserPassword> {
    static DUMMY: OnceLock<Option<UserPassword>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let raw = RawPassword::for_verification("timing-equalizer".to_string());
            UserPassword::hash_blocking(&raw).ok()
        })
        .as_ref()
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
