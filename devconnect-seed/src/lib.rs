//! # DevConnect Seeder Library
//!
//! Fills a development database with fake accounts, posts, comments and
//! likes.
//!
//! ## Modules
//!
//! - `generator`: Random names, profiles, text and dates
//! - `seeder`: Writes a generated data set through the shared models
//!
//! ## Example
//!
//! ```no_run
//! use devconnect_seed::seeder::{seed, SeedOptions};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), devconnect_seed::seeder::SeedError> {
//! let options = SeedOptions {
//!     users: 20,
//!     max_posts: 5,
//!     max_comments: 5,
//!     password: "password123".to_string(),
//! };
//! let report = seed(&pool, &mut StdRng::seed_from_u64(1), &options).await?;
//! println!("{} posts", report.posts);
//! # Ok(())
//! # }
//! ```

pub mod generator;
pub mod seeder;
