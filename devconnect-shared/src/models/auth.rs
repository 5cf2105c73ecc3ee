/// Auth records: login credentials and role codes
///
/// An auth record owns the credentials of an account. Its profile lives in
/// the `users` table under the same id (see [`crate::models::user`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auths (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     roles INTEGER[] NOT NULL DEFAULT '{101}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::models::auth::{AuthRecord, CreateAuth};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let auth = AuthRecord::create(&pool, CreateAuth {
///     username: "ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     roles: vec![101],
/// }).await?;
///
/// let found = AuthRecord::find_by_username_or_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|a| a.id), Some(auth.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::user::{CreateProfile, UserProfile};

const AUTH_COLUMNS: &str = "id, username, email, password_hash, roles, created_at, updated_at";

/// Credential record for one account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthRecord {
    /// Account ID, shared with the profile row
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role codes held by the account
    pub roles: Vec<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an auth record
#[derive(Debug, Clone)]
pub struct CreateAuth {
    pub username: String,
    pub email: String,
    /// Already-hashed password, never plaintext
    pub password_hash: String,
    pub roles: Vec<i32>,
}

impl AuthRecord {
    /// Inserts a new auth record
    ///
    /// Accepts any executor so signup can create the record and its profile
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint error if the username or email is taken.
    pub async fn create<'e, E>(executor: E, data: CreateAuth) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO auths (username, email, password_hash, roles) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            AUTH_COLUMNS
        );

        sqlx::query_as::<_, AuthRecord>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.roles)
            .fetch_one(executor)
            .await
    }

    /// Creates an auth record and its profile in one transaction
    ///
    /// Either both rows exist afterwards or neither does.
    pub async fn register(
        pool: &PgPool,
        data: CreateAuth,
        profile: CreateProfile,
    ) -> Result<(Self, UserProfile), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let auth = Self::create(&mut *tx, data).await?;
        let profile = UserProfile::create(&mut *tx, auth.id, profile).await?;

        tx.commit().await?;

        Ok((auth, profile))
    }

    /// Finds an auth record by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM auths WHERE id = $1", AUTH_COLUMNS);

        sqlx::query_as::<_, AuthRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an auth record whose username or email equals `identifier`
    ///
    /// A username match wins when one account's username equals another
    /// account's email.
    pub async fn find_by_username_or_email(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM auths WHERE username = $1 OR email = $1 \
             ORDER BY (username = $1) DESC LIMIT 1",
            AUTH_COLUMNS
        );

        sqlx::query_as::<_, AuthRecord>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// Finds an auth record by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM auths WHERE username = $1", AUTH_COLUMNS);

        sqlx::query_as::<_, AuthRecord>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Checks whether a username is already registered
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM auths WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Checks whether an email is already registered
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM auths WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Replaces the role codes of an account
    ///
    /// Returns the updated record, or `None` if the account does not exist.
    pub async fn update_roles(
        pool: &PgPool,
        id: Uuid,
        roles: &[i32],
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE auths SET roles = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            AUTH_COLUMNS
        );

        sqlx::query_as::<_, AuthRecord>(&query)
            .bind(id)
            .bind(roles)
            .fetch_optional(pool)
            .await
    }

    /// Replaces the password hash of an account
    ///
    /// Returns false if the account does not exist.
    pub async fn update_password<'e, E>(
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE auths
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an account; the profile, posts and comments cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auths WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every account except the one named `keep_username`
    ///
    /// Used by the seeder to reset development data.
    pub async fn delete_all_except(pool: &PgPool, keep_username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auths WHERE username <> $1")
            .bind(keep_username)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
