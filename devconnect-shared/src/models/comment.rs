/// Comments on posts
///
/// Comments are deleted with their post. Views embed the author summary under
/// `userId`:
///
/// ```json
/// {
///   "_id": "...",
///   "postId": "...",
///   "userId": { "_id": "...", "name": "Ada", "avatar": "" },
///   "content": "Nice write-up",
///   "createdAt": "...",
///   "updatedAt": "..."
/// }
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::post::PostAuthor;

const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.content, c.created_at, c.updated_at,
           u.id AS author_id, u.name AS author_name, u.avatar AS author_avatar
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// Comment row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with its author populated
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub post_id: Uuid,
    #[sqlx(flatten)]
    pub user_id: PostAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Checks whether `user_id` wrote the comment
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Adds a comment to a post
    ///
    /// `created_at` backdates the comment; `None` means now.
    ///
    /// # Errors
    ///
    /// Returns a foreign-key violation if the post does not exist.
    pub async fn create(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (post_id, user_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, COALESCE($4, NOW()), COALESCE($4, NOW())) \
             RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(user_id)
            .bind(content)
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    /// Finds a comment row by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds the view of a single comment
    pub async fn find_view(pool: &PgPool, id: Uuid) -> Result<Option<CommentView>, sqlx::Error> {
        let query = format!("{} WHERE c.id = $1", VIEW_SELECT);

        sqlx::query_as::<_, CommentView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comment views for a post, newest first
    pub async fn list_for_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<CommentView>, sqlx::Error> {
        let query = format!("{} WHERE c.post_id = $1 ORDER BY c.created_at DESC", VIEW_SELECT);

        sqlx::query_as::<_, CommentView>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Replaces the text of a comment
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of comments
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts comments created at or after `since`
    pub async fn count_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE created_at >= $1")
                .bind(since)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_view_populates_author_under_user_id() {
        let author = Uuid::new_v4();
        let post = Uuid::new_v4();
        let view = CommentView {
            id: Uuid::new_v4(),
            post_id: post,
            user_id: PostAuthor {
                id: author,
                name: "Barbara".to_string(),
                avatar: String::new(),
            },
            content: "Great point".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["postId"], post.to_string());
        assert_eq!(json["userId"]["_id"], author.to_string());
        assert_eq!(json["userId"]["name"], "Barbara");
        assert_eq!(json["content"], "Great point");
    }

    #[test]
    fn test_is_owned_by() {
        let writer = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            user_id: writer,
            content: "x".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(comment.is_owned_by(writer));
        assert!(!comment.is_owned_by(Uuid::new_v4()));
    }
}
