/// Configuration management for the API server
///
/// Configuration comes from environment variables; a `.env` file is loaded
/// first when present.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `ADMIN_PASSWORD`: Password for the bootstrap admin (default: admin123)
/// - `FRONTEND_URL`: Base URL used in password reset links (default: http://localhost:3000)
/// - `EMAIL_HOST` / `EMAIL_PORT` / `EMAIL_SECURE` / `EMAIL_USER` / `EMAIL_PASSWORD`: SMTP relay
/// - `SUPABASE_URL` / `SUPABASE_KEY` / `SUPABASE_BUCKET`: Object storage
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for human-readable
/// - `RUST_LOG`: Log filter
///
/// Email and storage are optional. Without SMTP credentials reset emails are
/// logged; without storage settings uploads answer 503.
///
/// # Example
///
/// ```no_run
/// use devconnect_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use devconnect_shared::services::{email::SmtpConfig, storage::SupabaseConfig};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,

    /// SMTP relay, `None` when credentials are absent
    pub email: Option<SmtpConfig>,

    /// Object storage, `None` when not configured
    pub storage: Option<SupabaseConfig>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; contains `*` for permissive CORS
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 secret, at least 32 characters
    pub secret: String,
}

/// Account-related settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Password given to the bootstrap admin account
    pub admin_password: String,

    /// Frontend base URL for password reset links
    pub frontend_url: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080").parse::<u16>()?;
        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let email = match (lookup("EMAIL_USER"), lookup("EMAIL_PASSWORD")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: var("EMAIL_HOST", "smtp.gmail.com"),
                port: var("EMAIL_PORT", "587").parse::<u16>()?,
                secure: var("EMAIL_SECURE", "false") == "true",
                username,
                password,
            }),
            _ => None,
        };

        let storage = match (
            lookup("SUPABASE_URL"),
            lookup("SUPABASE_KEY"),
            lookup("SUPABASE_BUCKET"),
        ) {
            (Some(url), Some(key), Some(bucket)) => Some(SupabaseConfig { url, key, bucket }),
            _ => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            auth: AuthConfig {
                admin_password: var("ADMIN_PASSWORD", "admin123"),
                frontend_url: var("FRONTEND_URL", "http://localhost:3000"),
            },
            email,
            storage,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
