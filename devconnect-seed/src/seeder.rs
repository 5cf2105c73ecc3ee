//! Writes generated data to the database

use chrono::Utc;
use devconnect_shared::{
    auth::password::{hash_password, PasswordError},
    db::bootstrap::ADMIN_USERNAME,
    models::{
        auth::{AuthRecord, CreateAuth},
        comment::Comment,
        post::{CreatePost, Post},
        role::{Role, RoleRecord},
    },
};
use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::generator::{date_after, fake_user, paragraph, pick_likers};

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Seeder options
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Accounts to create
    pub users: usize,

    /// Each account gets between 1 and this many posts
    pub max_posts: usize,

    /// Each post gets between 0 and this many comments
    pub max_comments: usize,

    /// Shared password of every generated account
    pub password: String,
}

/// What a run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub accounts_removed: u64,
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
}

struct SeededPost {
    id: Uuid,
    created_at: chrono::DateTime<Utc>,
}

/// Replaces all non-admin data with a fresh generated set
///
/// Deleting accounts cascades to their profiles, posts, comments and
/// reset tokens.
pub async fn seed<R: Rng + ?Sized>(
    pool: &PgPool,
    rng: &mut R,
    options: &SeedOptions,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let now = Utc::now();

    let roles = RoleRecord::seed_defaults(pool).await?;
    if roles > 0 {
        info!(count = roles, "Roles created");
    }

    report.accounts_removed = AuthRecord::delete_all_except(pool, ADMIN_USERNAME).await?;
    info!(count = report.accounts_removed, "Removed existing accounts");

    // Hashed once and shared by every account
    let password_hash = hash_password(&options.password)?;

    let mut authors = Vec::with_capacity(options.users);
    for index in 0..options.users {
        let user = fake_user(rng, index, now);
        let joined = user.profile.created_at.unwrap_or(now);

        let (auth, _) = AuthRecord::register(
            pool,
            CreateAuth {
                username: user.username,
                email: user.email,
                password_hash: password_hash.clone(),
                roles: vec![Role::User.code()],
            },
            user.profile,
        )
        .await?;

        debug!(user_id = %auth.id, username = %auth.username, "Created user");
        authors.push((auth.id, joined));
    }
    report.users = authors.len();
    info!(count = report.users, "Users created");

    let user_ids: Vec<Uuid> = authors.iter().map(|(id, _)| *id).collect();

    let mut posts = Vec::new();
    for (author, joined) in &authors {
        let count = rng.gen_range(1..=options.max_posts.max(1));

        for _ in 0..count {
            let sentences = rng.gen_range(2..=6);
            let post = Post::create(
                pool,
                *author,
                CreatePost {
                    content: paragraph(rng, sentences),
                    doc_uri: String::new(),
                    created_at: Some(date_after(rng, *joined, now)),
                },
            )
            .await?;

            posts.push(SeededPost {
                id: post.id,
                created_at: post.created_at,
            });
        }
    }
    report.posts = posts.len();
    info!(count = report.posts, "Posts created");

    for post in &posts {
        if user_ids.is_empty() {
            break;
        }

        let count = rng.gen_range(0..=options.max_comments);
        for _ in 0..count {
            let commenter = user_ids[rng.gen_range(0..user_ids.len())];
            let content = paragraph(rng, 1);
            let created_at = date_after(rng, post.created_at, now);

            Comment::create(pool, post.id, commenter, &content, Some(created_at)).await?;
            report.comments += 1;
        }
    }
    info!(count = report.comments, "Comments created");

    for post in &posts {
        let likers = pick_likers(rng, &user_ids);
        if likers.is_empty() {
            continue;
        }

        Post::set_likes(pool, post.id, &likers).await?;
        report.likes += likers.len();
    }
    info!(count = report.likes, "Likes added");

    Ok(report)
}
