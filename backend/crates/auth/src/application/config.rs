//! Application Configuration
//!
//! Configuration for the Auth application layer. Assembled by the binary and
//! injected; nothing in this crate reads the environment.

use std::fmt;
use std::time::Duration;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for access and reset tokens
    pub signing_secret: Vec<u8>,
    /// Access token lifetime (15 minutes)
    pub access_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_ttl: Duration,
    /// Password reset token lifetime (15 minutes)
    pub reset_ttl: Duration,
    /// Caller-side timeout for every store call
    pub store_timeout: Duration,
    /// Period of the expired/revoked refresh token sweep
    pub sweep_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: Vec::new(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            reset_ttl: Duration::from_secs(15 * 60),
            store_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random signing secret
    ///
    /// Tokens do not survive a restart.
    pub fn with_random_secret() -> Self {
        Self::with_secret(platform::crypto::random_bytes(32))
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// `expiresIn` reported to clients
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl.as_secs()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_ttl_secs(), 900);
        assert_eq!(config.refresh_ttl, Duration::from_secs(604_800));
        assert_eq!(config.reset_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_random_secrets_differ() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_eq!(a.signing_secret.len(), 32);
        assert_ne!(a.signing_secret, b.signing_secret);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = AuthConfig::with_secret(b"super-secret-signing-key".to_vec());
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
