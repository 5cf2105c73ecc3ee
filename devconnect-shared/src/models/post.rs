/// Posts, likes and the post view used by every post endpoint
///
/// Likes are stored inline as an array of user ids, so liking and unliking is
/// a single-row update. Views join the author's profile summary and count
/// comments on the fly.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     doc_uri TEXT NOT NULL DEFAULT '',
///     likes UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::pagination::PageParams;

const POST_COLUMNS: &str = "id, user_id, content, doc_uri, likes, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.content, p.doc_uri, p.likes, p.created_at, p.updated_at,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
           u.id AS author_id, u.name AS author_name, u.avatar AS author_avatar
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

/// Post row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,

    /// Author's profile id
    pub user_id: Uuid,

    pub content: String,

    /// Attached document or image URL, empty when none
    pub doc_uri: String,

    /// Ids of users who liked the post; no duplicates
    pub likes: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone, Default)]
pub struct CreatePost {
    pub content: String,
    pub doc_uri: String,
    /// Backdated creation time; `None` means now
    pub created_at: Option<DateTime<Utc>>,
}

/// Author summary embedded in post views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostAuthor {
    #[serde(rename = "_id")]
    #[sqlx(rename = "author_id")]
    pub id: Uuid,

    #[sqlx(rename = "author_name")]
    pub name: String,

    #[sqlx(rename = "author_avatar")]
    pub avatar: String,
}

/// Post joined with its author and comment count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub doc_uri: String,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments_count: i64,

    /// Only selected by the most-liked ranking
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes_count: Option<i64>,

    #[sqlx(flatten)]
    pub user: PostAuthor,
}

/// Feed ordering selected by the `sortBy` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSort {
    /// Most liked first
    Likes,
    /// Most commented first
    Comments,
    /// Newest first
    Recent,
    /// Newest first, ties broken by likes then comments
    #[default]
    Default,
}

impl FeedSort {
    /// Maps the `sortBy` value; anything unrecognized selects the default order
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("likes") => FeedSort::Likes,
            Some("comments") => FeedSort::Comments,
            Some("recent") => FeedSort::Recent,
            _ => FeedSort::Default,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            FeedSort::Likes => "cardinality(p.likes) DESC, p.created_at DESC",
            FeedSort::Comments => "comments_count DESC, p.created_at DESC",
            FeedSort::Recent => "p.created_at DESC",
            FeedSort::Default => "p.created_at DESC, cardinality(p.likes) DESC, comments_count DESC",
        }
    }
}

impl Post {
    /// Checks whether `user_id` authored the post
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Creates a post authored by `user_id`
    pub async fn create(pool: &PgPool, user_id: Uuid, data: CreatePost) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (user_id, content, doc_uri, created_at, updated_at) \
             VALUES ($1, $2, $3, COALESCE($4, NOW()), COALESCE($4, NOW())) \
             RETURNING {}",
            POST_COLUMNS
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(user_id)
            .bind(data.content)
            .bind(data.doc_uri)
            .bind(data.created_at)
            .fetch_one(pool)
            .await
    }

    /// Finds a post row by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds the view of a single post
    pub async fn find_view(pool: &PgPool, id: Uuid) -> Result<Option<PostView>, sqlx::Error> {
        let query = format!("{} WHERE p.id = $1", VIEW_SELECT);

        sqlx::query_as::<_, PostView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All post views, newest first
    pub async fn list_views(pool: &PgPool) -> Result<Vec<PostView>, sqlx::Error> {
        let query = format!("{} ORDER BY p.created_at DESC", VIEW_SELECT);

        sqlx::query_as::<_, PostView>(&query).fetch_all(pool).await
    }

    /// A page of posts written by anyone except `viewer_id`
    ///
    /// Returns the page and the total number of such posts.
    pub async fn feed(
        pool: &PgPool,
        viewer_id: Uuid,
        sort: FeedSort,
        params: PageParams,
    ) -> Result<(Vec<PostView>, i64), sqlx::Error> {
        let query = format!(
            "{} WHERE p.user_id <> $1 ORDER BY {} LIMIT $2 OFFSET $3",
            VIEW_SELECT,
            sort.order_by()
        );

        let items = sqlx::query_as::<_, PostView>(&query)
            .bind(viewer_id)
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool);

        let total = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM posts WHERE user_id <> $1")
            .bind(viewer_id)
            .fetch_one(pool);

        let (items, (total,)) = tokio::try_join!(items, total)?;

        Ok((items, total))
    }

    /// A page of posts written by `user_id`, newest first
    pub async fn by_author(
        pool: &PgPool,
        user_id: Uuid,
        params: PageParams,
    ) -> Result<(Vec<PostView>, i64), sqlx::Error> {
        let query = format!(
            "{} WHERE p.user_id = $1 ORDER BY p.created_at DESC LIMIT $2 OFFSET $3",
            VIEW_SELECT
        );

        let items = sqlx::query_as::<_, PostView>(&query)
            .bind(user_id)
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool);

        let total = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool);

        let (items, (total,)) = tokio::try_join!(items, total)?;

        Ok((items, total))
    }

    /// Updates content and document URI
    ///
    /// `None` content keeps the stored text. Returns `None` if the post is gone.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        content: Option<String>,
        doc_uri: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET content = COALESCE($2, content), doc_uri = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(content)
            .bind(doc_uri)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a post; its comments cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Likes the post for `user_id`, or removes the like if already present
    ///
    /// Runs as one UPDATE so concurrent toggles never duplicate an entry.
    /// Returns `None` if the post does not exist.
    pub async fn toggle_like(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET \
                likes = CASE WHEN $2 = ANY(likes) THEN array_remove(likes, $2) \
                             ELSE array_append(likes, $2) END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Replaces the like set without touching `updated_at`
    pub async fn set_likes(pool: &PgPool, id: Uuid, likes: &[Uuid]) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE posts SET likes = $2 WHERE id = $1")
            .bind(id)
            .bind(likes)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest post views
    pub async fn recent_views(pool: &PgPool, limit: i64) -> Result<Vec<PostView>, sqlx::Error> {
        let query = format!("{} ORDER BY p.created_at DESC LIMIT $1", VIEW_SELECT);

        sqlx::query_as::<_, PostView>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Post views ranked by like count, with `likesCount` filled in
    pub async fn most_liked(pool: &PgPool, limit: i64) -> Result<Vec<PostView>, sqlx::Error> {
        let query = r#"
            SELECT p.id, p.content, p.doc_uri, p.likes, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
                   cardinality(p.likes)::BIGINT AS likes_count,
                   u.id AS author_id, u.name AS author_name, u.avatar AS author_avatar
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY likes_count DESC, p.created_at DESC
            LIMIT $1
        "#;

        sqlx::query_as::<_, PostView>(query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Post views ranked by comment count
    pub async fn most_commented(pool: &PgPool, limit: i64) -> Result<Vec<PostView>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY comments_count DESC, p.created_at DESC LIMIT $1",
            VIEW_SELECT
        );

        sqlx::query_as::<_, PostView>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Lists every post id, used by the seeder
    pub async fn all_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM posts")
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Counts total number of posts
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts posts created at or after `since`
    pub async fn count_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
