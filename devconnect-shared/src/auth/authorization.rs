/// Authorization checks
///
/// Two kinds of checks exist:
///
/// 1. **Role gates**: an account must hold a role, resolved through the
///    `roles` table from the account's stored codes (not the token's).
/// 2. **Ownership rules**: posts may be changed by their author or an admin;
///    comments by their author, the post's author, or an admin.
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::auth::authorization::require_role;
/// use devconnect_shared::models::role::Role;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_role(&pool, user_id, Role::Admin).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::{
    auth::AuthRecord,
    comment::Comment,
    post::Post,
    role::{Role, RoleRecord},
};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Account no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Account lacks the required role
    #[error("Require {} Role!", role_label(.0))]
    MissingRole(Role),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

fn role_label(role: &Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Moderator => "Moderator",
        Role::Admin => "Admin",
    }
}

/// Checks that an account holds `required` according to the database
///
/// # Errors
///
/// - `UserNotFound` if the auth record is gone
/// - `MissingRole` if none of its codes resolves to the role's name
pub async fn require_role(pool: &PgPool, user_id: Uuid, required: Role) -> Result<(), AuthzError> {
    let auth = AuthRecord::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthzError::UserNotFound)?;

    let names = RoleRecord::names_for_codes(pool, &auth.roles).await?;

    if !names.iter().any(|name| name == required.name()) {
        tracing::warn!(
            user_id = %user_id,
            required = required.name(),
            "Role check failed"
        );
        return Err(AuthzError::MissingRole(required));
    }

    Ok(())
}

/// Post author or admin
pub fn can_modify_post(auth: &AuthContext, post: &Post) -> bool {
    auth.is_admin() || post.is_owned_by(auth.user_id)
}

/// Comment author, author of the commented post, or admin
///
/// `post` is `None` when the parent post could not be loaded.
pub fn can_modify_comment(auth: &AuthContext, comment: &Comment, post: Option<&Post>) -> bool {
    auth.is_admin()
        || comment.is_owned_by(auth.user_id)
        || post.is_some_and(|p| p.is_owned_by(auth.user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn caller(roles: Vec<i32>) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            username: "caller".to_string(),
            email: "caller@example.com".to_string(),
            roles,
        }
    }

    fn post_by(user_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            content: "post".to_string(),
            doc_uri: String::new(),
            likes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment_by(user_id: Uuid, post_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: "comment".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_owner_can_modify() {
        let me = caller(vec![101]);
        assert!(can_modify_post(&me, &post_by(me.user_id)));
    }

    #[test]
    fn test_stranger_cannot_modify_post() {
        let me = caller(vec![101, 102]);
        assert!(!can_modify_post(&me, &post_by(Uuid::new_v4())));
    }

    #[test]
    fn test_admin_can_modify_any_post() {
        let admin = caller(vec![103]);
        assert!(can_modify_post(&admin, &post_by(Uuid::new_v4())));
    }

    #[test]
    fn test_comment_rules() {
        let me = caller(vec![101]);
        let someone = Uuid::new_v4();

        let my_post = post_by(me.user_id);
        let their_post = post_by(someone);

        // My comment on someone else's post
        let mine = comment_by(me.user_id, their_post.id);
        assert!(can_modify_comment(&me, &mine, Some(&their_post)));

        // Someone's comment on my post
        let theirs_on_mine = comment_by(someone, my_post.id);
        assert!(can_modify_comment(&me, &theirs_on_mine, Some(&my_post)));

        // Someone's comment on someone's post
        let unrelated = comment_by(someone, their_post.id);
        assert!(!can_modify_comment(&me, &unrelated, Some(&their_post)));
        assert!(!can_modify_comment(&me, &unrelated, None));

        let admin = caller(vec![101, 103]);
        assert!(can_modify_comment(&admin, &unrelated, None));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthzError::UserNotFound.to_string(), "User not found");
        assert_eq!(
            AuthzError::MissingRole(Role::Admin).to_string(),
            "Require Admin Role!"
        );
        assert_eq!(
            AuthzError::MissingRole(Role::Moderator).to_string(),
            "Require Moderator Role!"
        );
    }
}
