/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password policy
/// - [`jwt`]: Access and password reset tokens
/// - [`middleware`]: Bearer token extraction and the request `AuthContext`
/// - [`authorization`]: Role gates and ownership rules
/// - [`reset`]: Reset token digests
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::auth::password::{hash_password, verify_password};
/// use devconnect_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "ada", "ada@example.com", vec![101], TokenType::Access);
/// let token = create_token(&claims, "secret-key-that-is-at-least-32-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset;
