//! # DevConnect Seeder
//!
//! Resets a development database to a generated data set. The bootstrap
//! administrator is kept; every other account is deleted first.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p devconnect-seed -- --users 20 --max-posts 5
//! ```

use anyhow::Context;
use clap::Parser;
use devconnect_seed::seeder::{seed, SeedOptions};
use devconnect_shared::db::{
    bootstrap::bootstrap,
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "devconnect-seed", about = "Fill a DevConnect database with fake data")]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Accounts to create
    #[arg(long, default_value_t = 20)]
    users: usize,

    /// Most posts per account (at least one each)
    #[arg(long, default_value_t = 5)]
    max_posts: usize,

    /// Most comments per post
    #[arg(long, default_value_t = 5)]
    max_comments: usize,

    /// Password shared by every generated account
    #[arg(long, env = "SEED_PASSWORD", default_value = "password123")]
    password: String,

    /// Administrator password if the admin account has to be created
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123")]
    admin_password: String,

    /// RNG seed for a reproducible data set
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devconnect_seed=info,devconnect_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("DevConnect seeder v{} starting", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(DatabaseConfig::new(cli.database_url.as_str(), 5))
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;
    bootstrap(&pool, &cli.admin_password)
        .await
        .context("Failed to bootstrap roles and admin")?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let options = SeedOptions {
        users: cli.users,
        max_posts: cli.max_posts,
        max_comments: cli.max_comments,
        password: cli.password,
    };

    let result = seed(&pool, &mut rng, &options).await;
    close_pool(pool).await;

    let report = result.context("Seeding failed")?;

    tracing::info!(
        removed = report.accounts_removed,
        users = report.users,
        posts = report.posts,
        comments = report.comments,
        likes = report.likes,
        "Seed completed"
    );

    Ok(())
}
