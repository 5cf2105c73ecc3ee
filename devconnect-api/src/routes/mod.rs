/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, signin, password reset and role updates
/// - `users`: Profiles and user search
/// - `posts`: Posts, feed and likes
/// - `comments`: Comments on posts
/// - `admin`: Dashboard and history analytics
/// - `upload`: Image upload to object storage

pub mod admin;
pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod upload;
pub mod users;

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{ "message": ... }` body used by mutations without a richer result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses an id taken from a path or body
///
/// Malformed ids answer 400 with `message`.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Invalid id").unwrap(), id);

        let err = parse_id("not-a-uuid", "Invalid postId").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Invalid postId"));
    }
}
