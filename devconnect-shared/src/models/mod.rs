/// Database models for DevConnect
///
/// Each model owns its SQL. Views (`PostView`, `CommentView`, `ProfileView`)
/// are the JSON shapes returned by the API.
///
/// # Models
///
/// - `role`: Role codes and the `roles` table
/// - `auth`: Credentials and role assignments
/// - `user`: Profiles
/// - `post`: Posts, likes and feed queries
/// - `comment`: Comments on posts
/// - `reset_token`: Password reset tokens
/// - `pagination`: Page parameters and paginated responses
/// - `analytics`: Admin history aggregations
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::models::post::{FeedSort, Post};
/// use devconnect_shared::models::pagination::{PageParams, PaginatedResponse};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, viewer: Uuid) -> Result<(), sqlx::Error> {
/// let params = PageParams::new(1, 10);
/// let (items, total) = Post::feed(&pool, viewer, FeedSort::Recent, params).await?;
/// let page = PaginatedResponse::new(items, params, total);
/// println!("{} posts in feed", page.pagination.total_items);
/// # Ok(())
/// # }
/// ```

pub mod analytics;
pub mod auth;
pub mod comment;
pub mod pagination;
pub mod post;
pub mod reset_token;
pub mod role;
pub mod user;
