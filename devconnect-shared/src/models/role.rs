/// Roles and the numeric role codes carried in tokens
///
/// Every account holds a list of role codes. The codes are fixed:
///
/// | Code | Name        |
/// |------|-------------|
/// | 101  | `user`      |
/// | 102  | `moderator` |
/// | 103  | `admin`     |
///
/// The `roles` table maps names to codes and is the source of truth for the
/// admin gate, which resolves an account's codes back to names.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id SERIAL PRIMARY KEY,
///     name TEXT NOT NULL UNIQUE,
///     code INTEGER NOT NULL UNIQUE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Built-in account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member (default at signup)
    User,

    /// Community moderator
    Moderator,

    /// Full administrative access
    Admin,
}

impl Role {
    /// All roles in code order
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    /// Numeric code stored on accounts and in tokens
    pub fn code(&self) -> i32 {
        match self {
            Role::User => 101,
            Role::Moderator => 102,
            Role::Admin => 103,
        }
    }

    /// Role name as stored in the `roles` table
    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Looks up a role by numeric code
    pub fn from_code(code: i32) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.code() == code)
    }

    /// Checks whether every code in `codes` names a known role
    pub fn all_valid(codes: &[i32]) -> bool {
        codes.iter().all(|code| Role::from_code(*code).is_some())
    }

    /// Drops repeated codes, keeping the first occurrence of each
    pub fn dedup_codes(codes: Vec<i32>) -> Vec<i32> {
        let mut unique = Vec::with_capacity(codes.len());
        for code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        unique
    }
}

/// Row of the `roles` table
///
/// Serialized as `{ "name": "admin", "enum": 103 }`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleRecord {
    #[serde(skip)]
    pub id: i32,

    pub name: String,

    #[serde(rename = "enum")]
    pub code: i32,
}

impl RoleRecord {
    /// Lists all roles ordered by code
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoleRecord>("SELECT id, name, code FROM roles ORDER BY code")
            .fetch_all(pool)
            .await
    }

    /// Counts rows in the `roles` table
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Inserts the built-in roles, skipping any that already exist
    ///
    /// Returns the number of rows inserted.
    pub async fn seed_defaults(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let names: Vec<&str> = Role::ALL.iter().map(|role| role.name()).collect();
        let codes: Vec<i32> = Role::ALL.iter().map(|role| role.code()).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO roles (name, code)
            SELECT * FROM UNNEST($1::TEXT[], $2::INTEGER[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&names)
        .bind(&codes)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Returns the subset of `codes` that exist in the `roles` table
    pub async fn existing_codes(pool: &PgPool, codes: &[i32]) -> Result<Vec<i32>, sqlx::Error> {
        let rows: Vec<(i32,)> = sqlx::query_as("SELECT code FROM roles WHERE code = ANY($1)")
            .bind(codes)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    /// Resolves role codes to role names through the `roles` table
    pub async fn names_for_codes(pool: &PgPool, codes: &[i32]) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM roles WHERE code = ANY($1) ORDER BY code")
                .bind(codes)
                .fetch_all(pool)
                .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
