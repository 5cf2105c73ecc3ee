/// Startup data: built-in roles and the administrator account
///
/// Runs on every server start and is idempotent:
///
/// 1. Inserts the `user`, `moderator` and `admin` roles if the table is empty
/// 2. Creates the `admin` account with profile "Admin" if it does not exist

use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::{
    auth::{AuthRecord, CreateAuth},
    role::{Role, RoleRecord},
    user::{CreateProfile, SocialLinks},
};

/// Username of the bootstrap administrator
pub const ADMIN_USERNAME: &str = "admin";

/// Email of the bootstrap administrator
pub const ADMIN_EMAIL: &str = "admin@devconnect.com";

/// Error type for startup bootstrap
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// What the bootstrap changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub roles_created: u64,
    pub admin_created: bool,
}

/// Profile given to the bootstrap administrator
pub fn admin_profile() -> CreateProfile {
    CreateProfile {
        name: "Admin".to_string(),
        bio: "System Administrator".to_string(),
        skills: "Administration, System Management".to_string(),
        social: SocialLinks {
            github: "https://github.com/admin".to_string(),
            linkedin: "https://linkedin.com/in/admin".to_string(),
            ..Default::default()
        },
        avatar: "https://via.placeholder.com/150".to_string(),
        created_at: None,
    }
}

/// Seeds roles and the administrator account
///
/// `admin_password` is only used when the account has to be created.
pub async fn bootstrap(pool: &PgPool, admin_password: &str) -> Result<BootstrapReport, BootstrapError> {
    let mut report = BootstrapReport::default();

    if RoleRecord::count(pool).await? == 0 {
        report.roles_created = RoleRecord::seed_defaults(pool).await?;
        info!(count = report.roles_created, "Roles initialized");
    }

    if AuthRecord::find_by_username(pool, ADMIN_USERNAME).await?.is_none() {
        let data = CreateAuth {
            username: ADMIN_USERNAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash_password(admin_password)?,
            roles: vec![Role::Admin.code()],
        };

        let (auth, _) = AuthRecord::register(pool, data, admin_profile()).await?;
        report.admin_created = true;
        info!(user_id = %auth.id, "Admin user created");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_profile() {
        let profile = admin_profile();
        assert_eq!(profile.name, "Admin");
        assert_eq!(profile.bio, "System Administrator");
        assert!(profile.social.twitter.is_empty());
        assert!(profile.created_at.is_none());
    }
}
