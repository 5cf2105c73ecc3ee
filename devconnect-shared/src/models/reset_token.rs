/// Password reset tokens
///
/// The reset JWT itself is only ever sent to the user; the table keeps its
/// SHA-256 digest together with the expiry and a single-use flag.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reset_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token_hash TEXT NOT NULL UNIQUE,
///     user_id UUID NOT NULL REFERENCES auths(id) ON DELETE CASCADE,
///     is_used BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const TOKEN_COLUMNS: &str = "id, token_hash, user_id, is_used, created_at, expires_at";

/// Why a stored reset token cannot be redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResetTokenError {
    #[error("Password reset token has expired.")]
    Expired,

    #[error("This password reset link has already been used.")]
    AlreadyUsed,
}

/// Stored reset token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResetToken {
    pub id: Uuid,
    /// Hex SHA-256 of the token sent by email
    pub token_hash: String,
    /// Auth record the token resets
    pub user_id: Uuid,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Checks expiry before the used flag
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), ResetTokenError> {
        if self.expires_at < now {
            return Err(ResetTokenError::Expired);
        }

        if self.is_used {
            return Err(ResetTokenError::AlreadyUsed);
        }

        Ok(())
    }

    /// Stores a new token digest
    pub async fn create(
        pool: &PgPool,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO reset_tokens (token_hash, user_id, expires_at) \
             VALUES ($1, $2, $3) RETURNING {}",
            TOKEN_COLUMNS
        );

        sqlx::query_as::<_, ResetToken>(&query)
            .bind(token_hash)
            .bind(user_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Finds a token by its digest
    pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM reset_tokens WHERE token_hash = $1", TOKEN_COLUMNS);

        sqlx::query_as::<_, ResetToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Marks a token used
    ///
    /// Returns false if it was already used, so two concurrent redemptions
    /// cannot both succeed.
    pub async fn mark_used<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE reset_tokens SET is_used = TRUE WHERE id = $1 AND NOT is_used")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes tokens that expired before `now`
    pub async fn purge_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reset_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration, is_used: bool) -> ResetToken {
        let now = Utc::now();
        ResetToken {
            id: Uuid::new_v4(),
            token_hash: "ab".repeat(32),
            user_id: Uuid::new_v4(),
            is_used,
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_fresh_token_is_usable() {
        assert!(token(Duration::hours(1), false).check_usable(Utc::now()).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let result = token(Duration::seconds(-1), false).check_usable(Utc::now());
        assert_eq!(result, Err(ResetTokenError::Expired));
    }

    #[test]
    fn test_used_token() {
        let result = token(Duration::hours(1), true).check_usable(Utc::now());
        assert_eq!(result, Err(ResetTokenError::AlreadyUsed));
    }

    #[test]
    fn test_expiry_reported_before_use() {
        let result = token(Duration::minutes(-5), true).check_usable(Utc::now());
        assert_eq!(result, Err(ResetTokenError::Expired));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ResetTokenError::Expired.to_string(),
            "Password reset token has expired."
        );
        assert_eq!(
            ResetTokenError::AlreadyUsed.to_string(),
            "This password reset link has already been used."
        );
    }
}
