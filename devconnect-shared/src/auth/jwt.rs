/// JWT token generation and validation module
///
/// DevConnect issues two kinds of HS256-signed tokens:
///
/// - **Access Token**: 24h, sent as `Authorization: Bearer <jwt>` on API calls
/// - **Password Reset Token**: 1h, mailed to the user and redeemed once
///
/// Both carry the account identity (id, username, email, role codes) so
/// handlers can authorize without a database round-trip. The `token_type`
/// claim keeps a reset token from being used as an access token.
///
/// # Example
///
/// ```
/// use devconnect_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "ada", "ada@example.com", vec![101], TokenType::Access);
/// let token = create_token(&claims, "a-secret-that-is-long-enough-for-hs256")?;
///
/// let validated = validate_access_token(&token, "a-secret-that-is-long-enough-for-hs256")?;
/// assert_eq!(validated.sub, user_id);
/// assert_eq!(validated.roles, vec![101]);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "devconnect";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is valid but of the wrong kind
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// API access token
    Access,

    /// Single-use password reset token
    PasswordReset,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::seconds(86_400),
            TokenType::PasswordReset => Duration::hours(1),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::PasswordReset => "password_reset",
        }
    }
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the account
/// identity and role codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account ID (shared by the auth and profile records)
    pub sub: Uuid,

    /// Login name
    pub username: String,

    /// Account email
    pub email: String,

    /// Role codes (101 user, 102 moderator, 103 admin)
    pub roles: Vec<i32>,

    /// Issuer - always "devconnect"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token ID, unique per issued token
    pub jti: Uuid,

    /// Token type
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims with the default lifetime for `token_type`
    pub fn new(
        user_id: Uuid,
        username: impl Into<String>,
        email: impl Into<String>,
        roles: Vec<i32>,
        token_type: TokenType,
    ) -> Self {
        Self::with_expiration(
            user_id,
            username,
            email,
            roles,
            token_type,
            token_type.default_expiration(),
        )
    }

    /// Creates claims expiring `expires_in` from now
    pub fn with_expiration(
        user_id: Uuid,
        username: impl Into<String>,
        email: impl Into<String>,
        roles: Vec<i32>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            username: username.into(),
            email: email.into(),
            roles,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, expiry, not-before and issuer, returning the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Access)
}

/// Validates a token and requires it to be a password reset token
pub fn validate_reset_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::PasswordReset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn claims(token_type: TokenType) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "grace",
            "grace@example.com",
            vec![101, 103],
            token_type,
        )
    }

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(24));
        assert_eq!(TokenType::PasswordReset.default_expiration(), Duration::hours(1));
    }

    #[test]
    fn test_token_type_serializes_snake_case() {
        let json = serde_json::to_string(&TokenType::PasswordReset).unwrap();
        assert_eq!(json, "\"password_reset\"");
    }

    #[test]
    fn test_create_and_validate_token() {
        let original = claims(TokenType::Access);
        let token = create_token(&original, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, original.sub);
        assert_eq!(validated.username, "grace");
        assert_eq!(validated.email, "grace@example.com");
        assert_eq!(validated.roles, vec![101, 103]);
        assert_eq!(validated.iss, ISSUER);
        assert!(!validated.is_expired());
    }

    #[test]
    fn test_same_identity_in_same_second_gets_distinct_tokens() {
        let user_id = Uuid::new_v4();
        let issue = || {
            let claims = Claims::new(user_id, "grace", "grace@example.com", vec![101], TokenType::PasswordReset);
            create_token(&claims, SECRET).unwrap()
        };

        let first = issue();
        let second = issue();
        assert_ne!(first, second);

        let first = validate_reset_token(&first, SECRET).unwrap();
        let second = validate_reset_token(&second, SECRET).unwrap();
        assert_eq!(first.sub, second.sub);
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&claims(TokenType::Access), SECRET).unwrap();

        assert!(validate_token(&token, "another-secret-key-at-least-32-bytes").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let expired = Claims::with_expiration(
            Uuid::new_v4(),
            "old",
            "old@example.com",
            vec![101],
            TokenType::Access,
            Duration::seconds(-3600),
        );
        assert!(expired.is_expired());

        let token = create_token(&expired, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            validate_token("not.a.jwt", SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_access_and_reset_tokens_are_not_interchangeable() {
        let access = create_token(&claims(TokenType::Access), SECRET).unwrap();
        let reset = create_token(&claims(TokenType::PasswordReset), SECRET).unwrap();

        assert!(validate_access_token(&access, SECRET).is_ok());
        assert!(validate_reset_token(&reset, SECRET).is_ok());

        assert!(matches!(
            validate_access_token(&reset, SECRET),
            Err(JwtError::WrongTokenType { expected: "access", .. })
        ));
        assert!(matches!(
            validate_reset_token(&access, SECRET),
            Err(JwtError::WrongTokenType { expected: "password_reset", .. })
        ));
    }
}
