/// Post endpoints
///
/// # Endpoints
///
/// - `GET /api/posts` - All posts (public)
/// - `POST /api/posts` - Create a post
/// - `GET /api/posts/feed` - Other users' posts, paginated and sortable
/// - `GET /api/posts/user/me` - Caller's posts
/// - `GET /api/posts/user/:userId` - A user's posts
/// - `GET|PUT|DELETE /api/posts/:id` - Read, update or delete one post
/// - `POST /api/posts/:id/like` - Like or unlike
///
/// Posts are always returned as views: the row joined with its author and
/// comment count.

use super::MessageResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use devconnect_shared::{
    auth::{authorization::can_modify_post, middleware::AuthContext},
    models::{
        pagination::{PageParams, PaginatedResponse, DEFAULT_LIMIT},
        post::{CreatePost, FeedSort, Post, PostView},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create post request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1 to 5000 characters"))]
    pub content: String,

    pub doc_uri: Option<String>,
}

/// Update post request
///
/// Omitted fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1 to 5000 characters"))]
    pub content: Option<String>,

    pub doc_uri: Option<String>,
}

/// Feed and listing query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
}

impl ListQuery {
    fn page_params(&self) -> PageParams {
        PageParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_LIMIT))
    }
}

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

fn post_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| post_not_found())
}

async fn load_view(state: &AppState, id: Uuid) -> ApiResult<PostView> {
    Post::find_view(&state.db, id)
        .await?
        .ok_or_else(post_not_found)
}

/// Loads a post the caller may change, or explains why not
async fn load_modifiable(state: &AppState, auth: &AuthContext, raw_id: &str, action: &str) -> ApiResult<Post> {
    let post = Post::find_by_id(&state.db, post_id(raw_id)?)
        .await?
        .ok_or_else(post_not_found)?;

    if !can_modify_post(auth, &post) {
        return Err(ApiError::Forbidden(format!(
            "Not authorized to {} this post",
            action
        )));
    }

    Ok(post)
}

/// Every post, newest first
pub async fn get_all_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    Ok(Json(Post::list_views(&state.db).await?))
}

/// Create a post authored by the caller
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    req.validate()?;

    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Content is required".to_string()));
    }

    let post = Post::create(
        &state.db,
        auth.user_id,
        CreatePost {
            content: req.content,
            doc_uri: req.doc_uri.unwrap_or_default(),
            created_at: None,
        },
    )
    .await?;

    tracing::info!(post_id = %post.id, user_id = %auth.user_id, "Post created");

    Ok((StatusCode::CREATED, Json(load_view(&state, post.id).await?)))
}

/// Posts by everyone except the caller
///
/// `sortBy` is one of `likes`, `comments` or `recent`; anything else sorts
/// by recency, then likes, then comments.
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<PostView>>> {
    let params = query.page_params();
    let sort = FeedSort::from_query(query.sort_by.as_deref());

    let (items, total) = Post::feed(&state.db, auth.user_id, sort, params).await?;

    Ok(Json(PaginatedResponse::new(items, params, total)))
}

async fn posts_by(state: &AppState, user_id: Uuid, query: &ListQuery) -> ApiResult<PaginatedResponse<PostView>> {
    let params = query.page_params();
    let (items, total) = Post::by_author(&state.db, user_id, params).await?;

    Ok(PaginatedResponse::new(items, params, total))
}

/// Caller's own posts, newest first
pub async fn get_my_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<PostView>>> {
    Ok(Json(posts_by(&state, auth.user_id, &query).await?))
}

/// A user's posts, newest first
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<PostView>>> {
    let user_id = super::parse_id(&user_id, "Invalid userId")?;

    Ok(Json(posts_by(&state, user_id, &query).await?))
}

/// A single post
pub async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostView>> {
    Ok(Json(load_view(&state, post_id(&id)?).await?))
}

/// Update a post (owner or admin)
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostView>> {
    req.validate()?;

    let post = load_modifiable(&state, &auth, &id, "update").await?;
    let doc_uri = req.doc_uri.unwrap_or(post.doc_uri);

    Post::update(&state.db, post.id, req.content, doc_uri)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(load_view(&state, post.id).await?))
}

/// Delete a post and its comments (owner or admin)
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let post = load_modifiable(&state, &auth, &id, "delete").await?;

    if !Post::delete(&state.db, post.id).await? {
        return Err(post_not_found());
    }

    tracing::info!(post_id = %post.id, user_id = %auth.user_id, "Post deleted");

    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// Like the post, or remove the caller's like
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostView>> {
    let post = Post::toggle_like(&state.db, post_id(&id)?, auth.user_id)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(load_view(&state, post.id).await?))
}
