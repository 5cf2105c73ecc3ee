/// User profiles and their queries
///
/// A profile row is created alongside every auth record and shares its id.
/// All text fields default to the empty string; an empty `name` marks a
/// profile the owner never filled in, and such profiles are hidden from
/// search.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY REFERENCES auths(id) ON DELETE CASCADE,
///     name TEXT NOT NULL DEFAULT '',
///     bio TEXT NOT NULL DEFAULT '',
///     skills TEXT NOT NULL DEFAULT '',
///     github TEXT NOT NULL DEFAULT '',
///     linkedin TEXT NOT NULL DEFAULT '',
///     twitter TEXT NOT NULL DEFAULT '',
///     website TEXT NOT NULL DEFAULT '',
///     avatar TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::models::user::{UpdateProfile, UserProfile};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let update = UpdateProfile {
///     name: Some("Ada Lovelace".to_string()),
///     skills: Some("rust, analytical engines".to_string()),
///     ..Default::default()
/// };
///
/// if let Some(profile) = UserProfile::update(&pool, user_id, update).await? {
///     println!("Updated {}", profile.name);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::pagination::PageParams;

const PROFILE_COLUMNS: &str = "id, name, bio, skills, github, linkedin, twitter, website, avatar, \
                               created_at, updated_at";

/// Profile row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub skills: String,
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub website: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Social links nested under `social` in profile views
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub website: String,
}

/// Input for creating a profile with initial values
#[derive(Debug, Clone, Default)]
pub struct CreateProfile {
    pub name: String,
    pub bio: String,
    pub skills: String,
    pub social: SocialLinks,
    pub avatar: String,
    /// Backdated creation time; `None` means now
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial profile update
///
/// Only `Some` fields are written. Social links are flattened so each one can
/// be changed independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfile {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.columns().next().is_none()
    }

    fn columns(&self) -> impl Iterator<Item = (&'static str, &String)> {
        [
            ("name", self.name.as_ref()),
            ("bio", self.bio.as_ref()),
            ("skills", self.skills.as_ref()),
            ("github", self.github.as_ref()),
            ("linkedin", self.linkedin.as_ref()),
            ("twitter", self.twitter.as_ref()),
            ("website", self.website.as_ref()),
            ("avatar", self.avatar.as_ref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
    }
}

/// Full profile as returned by `/api/user` endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub skills: String,
    pub social: SocialLinks,
    pub avatar: String,
    pub roles: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileView {
    /// Builds a view; `roles` is empty for public profiles
    pub fn new(profile: UserProfile, roles: Vec<i32>) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            bio: profile.bio,
            skills: profile.skills,
            social: SocialLinks {
                github: profile.github,
                linkedin: profile.linkedin,
                twitter: profile.twitter,
                website: profile.website,
            },
            avatar: profile.avatar,
            roles,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Search result entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for SearchUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            bio: profile.bio,
            avatar: profile.avatar,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Newly joined user shown on the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl UserProfile {
    /// Creates a profile with initial values
    ///
    /// Signup passes `CreateProfile::default()`, leaving every field empty.
    pub async fn create<'e, E>(executor: E, id: Uuid, data: CreateProfile) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (id, name, bio, skills, github, linkedin, twitter, website, avatar, \
                                created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, NOW()), COALESCE($10, NOW())) \
             RETURNING {}",
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.bio)
            .bind(data.skills)
            .bind(data.social.github)
            .bind(data.social.linkedin)
            .bind(data.social.twitter)
            .bind(data.social.website)
            .bind(data.avatar)
            .bind(data.created_at)
            .fetch_one(executor)
            .await
    }

    /// Finds a profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS);

        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update
    ///
    /// Returns the updated profile, or `None` if it does not exist. An empty
    /// update still bumps `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        for (column, _) in data.columns() {
            bind_count += 1;
            query.push_str(&format!(", {} = ${}", column, bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", PROFILE_COLUMNS));

        let mut q = sqlx::query_as::<_, UserProfile>(&query).bind(id);
        for (_, value) in data.columns() {
            q = q.bind(value);
        }

        q.fetch_optional(pool).await
    }

    /// Case-insensitive search over name, bio and skills
    ///
    /// Excludes `exclude_id` and profiles with an empty name, ordered by name.
    /// Returns the page and the total match count.
    pub async fn search(
        pool: &PgPool,
        exclude_id: Uuid,
        search: &str,
        params: PageParams,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let pattern = like_pattern(search);
        let filter = "id <> $1 AND name <> '' \
                      AND (name ILIKE $2 OR bio ILIKE $2 OR skills ILIKE $2)";

        let select = format!(
            "SELECT {} FROM users WHERE {} ORDER BY name ASC LIMIT $3 OFFSET $4",
            PROFILE_COLUMNS, filter
        );
        let count = format!("SELECT COUNT(*) FROM users WHERE {}", filter);

        let items = sqlx::query_as::<_, UserProfile>(&select)
            .bind(exclude_id)
            .bind(&pattern)
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool);

        let total = sqlx::query_as::<_, (i64,)>(&count)
            .bind(exclude_id)
            .bind(&pattern)
            .fetch_one(pool);

        let (items, (total,)) = tokio::try_join!(items, total)?;

        Ok((items, total))
    }

    /// Newest profiles first
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentUser>, sqlx::Error> {
        sqlx::query_as::<_, RecentUser>(
            r#"
            SELECT id, name, avatar, bio, created_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Lists every profile id, used by the seeder
    pub async fn all_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM users")
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Counts total number of profiles
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts profiles created at or after `since`
    pub async fn count_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Margaret".to_string(),
            bio: "Apollo guidance".to_string(),
            skills: "assembly".to_string(),
            github: "https://github.com/mh".to_string(),
            linkedin: String::new(),
            twitter: String::new(),
            website: "https://example.com".to_string(),
            avatar: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_profile_default_is_empty() {
        assert!(UpdateProfile::default().is_empty());

        let update = UpdateProfile {
            twitter: Some("@mh".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(update.columns().map(|(c, _)| c).collect::<Vec<_>>(), vec!["twitter"]);
    }

    #[test]
    fn test_update_profile_columns_keep_order() {
        let update = UpdateProfile {
            avatar: Some("a.png".to_string()),
            name: Some("N".to_string()),
            github: Some("gh".to_string()),
            ..Default::default()
        };

        let columns: Vec<_> = update.columns().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["name", "github", "avatar"]);
    }

    #[test]
    fn test_profile_view_shape() {
        let p = profile();
        let id = p.id;
        let json = serde_json::to_value(ProfileView::new(p, vec![101])).unwrap();

        assert_eq!(json["_id"], id.to_string());
        assert_eq!(json["social"]["github"], "https://github.com/mh");
        assert_eq!(json["social"]["website"], "https://example.com");
        assert_eq!(json["roles"], serde_json::json!([101]));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("github").is_none());
    }

    #[test]
    fn test_search_user_drops_private_fields() {
        let json = serde_json::to_value(SearchUser::from(profile())).unwrap();

        assert_eq!(json["name"], "Margaret");
        assert!(json.get("skills").is_none());
        assert!(json.get("social").is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
