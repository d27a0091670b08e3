//! PostgreSQL Repository Implementations

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kernel::id::RefreshTokenId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Default caller-side timeout for a single store call
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    store_timeout: Duration,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_timeout(pool, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(pool: PgPool, store_timeout: Duration) -> Self {
        Self {
            pool,
            store_timeout,
        }
    }

    /// Run a single statement under the store timeout
    async fn timed<T>(&self, fut: impl Future<Output = Result<T, sqlx::Error>>) -> AuthResult<T> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Run a whole transaction under the store timeout
    ///
    /// Dropping the future on timeout drops the `Transaction`, which rolls back.
    async fn timed_tx<T>(&self, fut: impl Future<Output = AuthResult<T>>) -> AuthResult<T> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| self.timed_out())?
    }

    fn timed_out(&self) -> AuthError {
        tracing::warn!(timeout = ?self.store_timeout, "Store call timed out");
        AuthError::StoreTimeout
    }

    async fn rotate_in_tx(
        &self,
        old_hash: &str,
        user_id: &UserId,
        replacement: &RefreshToken,
    ) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Row lock: a concurrent rotation of the same hash waits here, then
        // re-checks `NOT revoked` and matches nothing.
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_hash = $1
              AND user_id = $2
              AND NOT revoked
              AND expires_at > NOW()
            "#,
        )
        .bind(old_hash)
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if revoked == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_refresh_token(&mut *tx, replacement).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn replace_password_in_tx(
        &self,
        user_id: &UserId,
        password: &UserPassword,
    ) -> AuthResult<u64> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(password.as_phc_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(AuthError::UserNotFound);
        }

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked",
        )
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(revoked)
    }
}

async fn insert_refresh_token<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (
            id,
            user_id,
            token_hash,
            expires_at,
            revoked,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(token.id.as_uuid())
    .bind(token.user_id.as_uuid())
    .bind(&token.token_hash)
    .bind(token.expires_at)
    .bind(token.revoked)
    .bind(token.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Map unique violations on `users` to the matching conflict
fn map_user_conflict(err: AuthError) -> AuthError {
    let constraint = match &err {
        AuthError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    };

    match constraint.as_deref() {
        Some("users_username_key") => AuthError::UsernameTaken,
        Some("users_email_key") => AuthError::EmailTaken,
        _ => err,
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.timed(
            sqlx::query(
                r#"
                INSERT INTO users (
                    id,
                    username,
                    email,
                    password_hash,
                    role,
                    created_at,
                    updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(user.user_id.as_uuid())
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_phc_string())
            .bind(user.role.code())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool),
        )
        .await
        .map_err(map_user_conflict)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = self
            .timed(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(user_id.as_uuid())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = self
            .timed(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(username.as_str())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = self
            .timed(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(email.as_str())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_username(&self, username: &UserName) -> AuthResult<bool> {
        self.timed(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.timed(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        let rows = self
            .timed(sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.pool))
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update_email(&self, user_id: &UserId, email: &Email) -> AuthResult<()> {
        let updated = self
            .timed(
                sqlx::query("UPDATE users SET email = $2, updated_at = NOW() WHERE id = $1")
                    .bind(user_id.as_uuid())
                    .bind(email.as_str())
                    .execute(&self.pool),
            )
            .await
            .map_err(map_user_conflict)?
            .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn update_role(&self, user_id: &UserId, role: UserRole) -> AuthResult<()> {
        let updated = self
            .timed(
                sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
                    .bind(user_id.as_uuid())
                    .bind(role.code())
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let deleted = self
            .timed(
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(user_id.as_uuid())
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn admin_exists(&self) -> AuthResult<bool> {
        self.timed(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        password: &UserPassword,
    ) -> AuthResult<u64> {
        self.timed_tx(self.replace_password_in_tx(user_id, password))
            .await
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

impl RefreshTokenRepository for PgAuthRepository {
    async fn insert(&self, token: &RefreshToken) -> AuthResult<()> {
        self.timed(insert_refresh_token(&self.pool, token)).await
    }

    async fn find_active_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let row = self
            .timed(
                sqlx::query_as::<_, RefreshTokenRow>(
                    r#"
                    SELECT id, user_id, token_hash, expires_at, revoked, created_at
                    FROM refresh_tokens
                    WHERE token_hash = $1
                      AND NOT revoked
                      AND expires_at > NOW()
                    "#,
                )
                .bind(token_hash)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(RefreshTokenRow::into_refresh_token))
    }

    async fn rotate(
        &self,
        old_hash: &str,
        user_id: &UserId,
        replacement: &RefreshToken,
    ) -> AuthResult<bool> {
        self.timed_tx(self.rotate_in_tx(old_hash, user_id, replacement))
            .await
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> AuthResult<u64> {
        let result = self
            .timed(
                sqlx::query(
                    "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1 AND NOT revoked",
                )
                .bind(token_hash)
                .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let result = self
            .timed(
                sqlx::query(
                    "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked",
                )
                .bind(user_id.as_uuid())
                .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn sweep(&self) -> AuthResult<u64> {
        let result = self
            .timed(
                sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW() OR revoked")
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role in database: {}", self.role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    fn into_refresh_token(self) -> RefreshToken {
        RefreshToken {
            id: RefreshTokenId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            revoked: self.revoked,
            created_at: self.created_at,
        }
    }
}
