//! Token Service
//!
//! Two layers:
//! - signed claims (HS256 JWT), pure over secret + clock: access and password
//!   reset tokens
//! - the refresh token ledger: opaque random secrets whose SHA-256 is stored,
//!   rotated and revoked through [`RefreshTokenRepository`]
//!
//! The `typ` claim keeps the two JWT kinds apart: an access token is never
//! accepted as a reset token and vice versa.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::refresh_token::RefreshToken;
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Random bytes per refresh secret (hex encoded to 80 chars)
pub const REFRESH_TOKEN_BYTES: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    #[display("access")]
    Access,
    #[display("password_reset")]
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    pub role: UserRole,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Account email
    pub sub: String,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Why a signed token was rejected
///
/// Callers collapse both into one 401; the split exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::Unauthorized
    }
}

/// A freshly minted refresh secret
///
/// `plaintext` goes to the client exactly once; only `hash` is persisted.
pub struct IssuedRefreshToken {
    pub plaintext: String,
    pub hash: String,
}

impl std::fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("plaintext", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Signed tokens
// ============================================================================

pub fn issue_access_token(config: &AuthConfig, user_id: &UserId, role: UserRole) -> AuthResult<String> {
    issue_access_token_at(config, user_id, role, Utc::now())
}

pub(crate) fn issue_access_token_at(
    config: &AuthConfig,
    user_id: &UserId,
    role: UserRole,
    issued_at: DateTime<Utc>,
) -> AuthResult<String> {
    let (iat, exp) = lifetime(issued_at, config.access_ttl)?;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        role,
        typ: TokenType::Access,
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
    };
    sign(config, &claims)
}

pub fn verify_access_token(config: &AuthConfig, token: &str) -> Result<AccessClaims, TokenError> {
    let claims: AccessClaims = decode(config, token)?;
    if claims.typ != TokenType::Access {
        return Err(TokenError::Invalid);
    }
    Ok(claims)
}

pub fn issue_reset_token(config: &AuthConfig, email: &Email) -> AuthResult<String> {
    issue_reset_token_at(config, email, Utc::now())
}

pub(crate) fn issue_reset_token_at(
    config: &AuthConfig,
    email: &Email,
    issued_at: DateTime<Utc>,
) -> AuthResult<String> {
    let (iat, exp) = lifetime(issued_at, config.reset_ttl)?;
    let claims = ResetClaims {
        sub: email.as_str().to_string(),
        typ: TokenType::PasswordReset,
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
    };
    sign(config, &claims)
}

/// Email the reset token was issued for
pub fn verify_reset_token(config: &AuthConfig, token: &str) -> Result<String, TokenError> {
    let claims: ResetClaims = decode(config, token)?;
    if claims.typ != TokenType::PasswordReset {
        return Err(TokenError::Invalid);
    }
    Ok(claims.sub)
}

fn lifetime(issued_at: DateTime<Utc>, ttl: std::time::Duration) -> AuthResult<(i64, i64)> {
    let ttl = TimeDelta::from_std(ttl)
        .map_err(|_| AuthError::Internal("token TTL out of range".into()))?;
    let iat = issued_at.timestamp();
    let exp = iat
        .checked_add(ttl.num_seconds())
        .ok_or_else(|| AuthError::Internal("token exp overflow".into()))?;
    Ok((iat, exp))
}

fn sign<C: Serialize>(config: &AuthConfig, claims: &C) -> AuthResult<String> {
    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(&config.signing_secret))
        .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
}

fn decode<C: serde::de::DeserializeOwned>(config: &AuthConfig, token: &str) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);

    jsonwebtoken::decode::<C>(
        token,
        &DecodingKey::from_secret(&config.signing_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

// ============================================================================
// Refresh tokens
// ============================================================================

/// New refresh secret: 40 CSPRNG bytes, hex encoded
pub fn issue_refresh_token() -> IssuedRefreshToken {
    let plaintext = platform::crypto::random_hex(REFRESH_TOKEN_BYTES);
    let hash = hash_refresh_secret(&plaintext);
    IssuedRefreshToken { plaintext, hash }
}

/// Hex SHA-256, the only form a refresh secret is stored in
pub fn hash_refresh_secret(plaintext: &str) -> String {
    platform::crypto::sha256_hex(plaintext.as_bytes())
}

/// Ledger operations over a [`RefreshTokenRepository`]
pub struct TokenService<T>
where
    T: RefreshTokenRepository,
{
    tokens: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<T> TokenService<T>
where
    T: RefreshTokenRepository,
{
    pub fn new(tokens: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self { tokens, config }
    }

    pub fn issue_access_token(&self, user_id: &UserId, role: UserRole) -> AuthResult<String> {
        issue_access_token(&self.config, user_id, role)
    }

    /// Mint a refresh secret and persist its hash
    pub async fn store_refresh_token(&self, user_id: &UserId) -> AuthResult<IssuedRefreshToken> {
        let issued = issue_refresh_token();
        let row = RefreshToken::new(*user_id, issued.hash.clone(), self.config.refresh_ttl)?;
        self.tokens.insert(&row).await?;
        Ok(issued)
    }

    /// Revoke `old_hash` and persist a replacement in one transaction
    ///
    /// `Unauthorized` when the old row is no longer active, including when a
    /// concurrent rotation of the same secret got there first.
    pub async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        user_id: &UserId,
    ) -> AuthResult<IssuedRefreshToken> {
        let issued = issue_refresh_token();
        let row = RefreshToken::new(*user_id, issued.hash.clone(), self.config.refresh_ttl)?;

        if !self.tokens.rotate(old_hash, user_id, &row).await? {
            tracing::warn!(user_id = %user_id, "Refresh token reuse or race rejected");
            return Err(AuthError::Unauthorized);
        }

        Ok(issued)
    }
}
