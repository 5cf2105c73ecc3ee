/// Database layer for DevConnect
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: Embedded schema migrations
/// - `bootstrap`: Built-in roles and the administrator account
///
/// Models live in [`crate::models`].
///
/// # Example
///
/// ```no_run
/// use devconnect_shared::db::{bootstrap::bootstrap, migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?, 10)).await?;
///     run_migrations(&pool).await?;
///     bootstrap(&pool, "admin123").await?;
///     Ok(())
/// }
/// ```

pub mod bootstrap;
pub mod migrations;
pub mod pool;
