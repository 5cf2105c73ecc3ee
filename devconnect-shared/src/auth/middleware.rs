/// Request authentication for Axum
///
/// Turns an `Authorization: Bearer <jwt>` header into an [`AuthContext`]
/// which the API's auth layer inserts into request extensions.
///
/// Failure responses:
///
/// | Condition                         | Status | Message                 |
/// |-----------------------------------|--------|-------------------------|
/// | No `Authorization` header         | 403    | `No token provided!`    |
/// | Header does not start `Bearer `   | 403    | `Invalid token format!` |
/// | Bad, expired or non-access token  | 401    | `Unauthorized!`         |
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use devconnect_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims};
use crate::models::role::Role;

/// Authenticated caller, taken from a validated access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account ID
    pub user_id: Uuid,

    pub username: String,

    pub email: String,

    /// Role codes as issued at sign-in
    pub roles: Vec<i32>,
}

impl AuthContext {
    /// Checks whether the token carries the admin role code
    ///
    /// Used for ownership overrides. Admin-only routes re-check roles against
    /// the database instead.
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin.code())
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("No token provided!")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("Invalid token format!")]
    InvalidFormat,

    /// Token failed validation
    #[error("Unauthorized!")]
    InvalidToken,
}

/// Extracts the raw token from a bearer `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;

    value.strip_prefix("Bearer ").ok_or(AuthError::InvalidFormat)
}

/// Validates the request's bearer token and returns the caller
///
/// Only access tokens are accepted; a password reset token is rejected like
/// any other invalid token.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError::InvalidToken
    })?;

    Ok(AuthContext::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "middleware-test-secret-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token(token_type: TokenType, roles: Vec<i32>) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "alan", "alan@example.com", roles, token_type);
        (id, create_token(&claims, SECRET).unwrap())
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert_eq!(result, Err(AuthError::MissingCredentials));
    }

    #[test]
    fn test_non_bearer_header() {
        let result = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET);
        assert_eq!(result, Err(AuthError::InvalidFormat));

        let result = authenticate(&headers_with("bearer lowercase"), SECRET);
        assert_eq!(result, Err(AuthError::InvalidFormat));
    }

    #[test]
    fn test_invalid_token() {
        let result = authenticate(&headers_with("Bearer nonsense"), SECRET);
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_reset_token_is_not_accepted() {
        let (_, reset) = token(TokenType::PasswordReset, vec![101]);
        let result = authenticate(&headers_with(&format!("Bearer {}", reset)), SECRET);
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_valid_token() {
        let (id, access) = token(TokenType::Access, vec![101, 103]);
        let context = authenticate(&headers_with(&format!("Bearer {}", access)), SECRET).unwrap();

        assert_eq!(context.user_id, id);
        assert_eq!(context.username, "alan");
        assert_eq!(context.roles, vec![101, 103]);
        assert!(context.is_admin());
    }

    #[test]
    fn test_is_admin() {
        let context = AuthContext {
            user_id: Uuid::new_v4(),
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            roles: vec![101, 102],
        };
        assert!(!context.is_admin());
    }
}
