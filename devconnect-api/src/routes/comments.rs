/// Comment endpoints
///
/// # Endpoints
///
/// - `POST /api/comment` - Comment on a post
/// - `GET /api/comments/post/:postId` - Comments on a post, newest first
/// - `GET|PUT|DELETE /api/comment/:id` - Read, update or delete one comment
///
/// A comment can be changed by its author, by the author of the post it
/// belongs to, or by an admin.

use super::{parse_id, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use devconnect_shared::{
    auth::{authorization::can_modify_comment, middleware::AuthContext},
    models::{
        comment::{Comment, CommentView},
        post::Post,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,

    #[validate(length(min = 1, max = 2000, message = "Content must be 1 to 2000 characters"))]
    pub content: String,
}

/// Update comment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1 to 2000 characters"))]
    pub content: String,
}

fn comment_not_found() -> ApiError {
    ApiError::NotFound("Comment not found".to_string())
}

fn comment_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| comment_not_found())
}

async fn load_view(state: &AppState, id: Uuid) -> ApiResult<CommentView> {
    Comment::find_view(&state.db, id)
        .await?
        .ok_or_else(comment_not_found)
}

/// Loads a comment the caller may change, or explains why not
async fn load_modifiable(
    state: &AppState,
    auth: &AuthContext,
    raw_id: &str,
    action: &str,
) -> ApiResult<Comment> {
    let comment = Comment::find_by_id(&state.db, comment_id(raw_id)?)
        .await?
        .ok_or_else(comment_not_found)?;

    let post = Post::find_by_id(&state.db, comment.post_id).await?;

    if !can_modify_comment(auth, &comment, post.as_ref()) {
        return Err(ApiError::Forbidden(format!(
            "Not authorized to {} this comment",
            action
        )));
    }

    Ok(comment)
}

/// Comment on a post
///
/// # Errors
///
/// - `400 Bad Request`: Malformed `postId`
/// - `404 Not Found`: Post does not exist
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let post_id = parse_id(&req.post_id, "Invalid postId")?;
    req.validate()?;

    if Post::find_by_id(&state.db, post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let comment = Comment::create(&state.db, post_id, auth.user_id, &req.content, None).await?;

    tracing::info!(comment_id = %comment.id, %post_id, "Comment created");

    Ok((StatusCode::CREATED, Json(load_view(&state, comment.id).await?)))
}

/// Comments on a post, newest first
pub async fn get_comments_by_post_id(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let post_id = parse_id(&post_id, "Invalid postId")?;

    Ok(Json(Comment::list_for_post(&state.db, post_id).await?))
}

/// A single comment
pub async fn get_comment_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentView>> {
    Ok(Json(load_view(&state, comment_id(&id)?).await?))
}

/// Replace a comment's text
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<CommentView>> {
    req.validate()?;

    let comment = load_modifiable(&state, &auth, &id, "update").await?;

    Comment::update_content(&state.db, comment.id, &req.content)
        .await?
        .ok_or_else(comment_not_found)?;

    Ok(Json(load_view(&state, comment.id).await?))
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = load_modifiable(&state, &auth, &id, "delete").await?;

    if !Comment::delete(&state.db, comment.id).await? {
        return Err(comment_not_found());
    }

    tracing::info!(comment_id = %comment.id, user_id = %auth.user_id, "Comment deleted");

    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request() {
        let req: CreateCommentRequest = serde_json::from_value(serde_json::json!({
            "postId": "5b0c6d16-1b0d-4a3e-9b53-6a3f9d2f2a10",
            "content": "Nice post"
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(parse_id(&req.post_id, "Invalid postId").is_ok());
    }

    #[test]
    fn test_empty_update_rejected() {
        let req = UpdateCommentRequest {
            content: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_malformed_comment_id_is_not_found() {
        assert!(matches!(comment_id("x"), Err(ApiError::NotFound(ref m)) if m == "Comment not found"));
    }
}
