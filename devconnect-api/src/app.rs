/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use devconnect_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::from_config(pool, config)?;
/// let app = devconnect_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};
use devconnect_shared::{
    auth::{
        authorization::require_role,
        middleware::{authenticate, AuthContext},
    },
    models::role::Role,
    services::{
        email::{LogMailer, Mailer, SmtpMailer},
        storage::{ObjectStorage, SupabaseStorage},
    },
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted upload body
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Delivers password reset emails
    pub mailer: Arc<dyn Mailer>,

    /// Image storage, absent when not configured
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

impl AppState {
    /// Creates state with a logging mailer and no storage
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer: Arc::new(LogMailer),
            storage: None,
        }
    }

    /// Creates state with the outbound services the configuration enables
    pub fn from_config(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn Mailer> = match &config.email {
            Some(smtp) => {
                tracing::info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
                Arc::new(SmtpMailer::new(smtp)?)
            }
            None => {
                tracing::warn!("EMAIL_USER/EMAIL_PASSWORD not set, reset emails will be logged");
                Arc::new(LogMailer)
            }
        };

        let storage: Option<Arc<dyn ObjectStorage>> = match &config.storage {
            Some(supabase) => {
                tracing::info!(bucket = %supabase.bucket, "Object storage configured");
                Some(Arc::new(SupabaseStorage::new(supabase.clone())?))
            }
            None => {
                tracing::warn!("Supabase storage not configured, uploads are disabled");
                None
            }
        };

        Ok(Self {
            db,
            config: Arc::new(config),
            mailer,
            storage,
        })
    }

    /// Replaces the mailer
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Replaces the object storage
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// ├── POST /upload                      (JWT)
/// └── /api
///     ├── /auth
///     │   ├── POST /signup
///     │   ├── POST /signin
///     │   ├── POST /forgotPassword
///     │   ├── POST /resetPassword
///     │   └── POST /updateRoles         (JWT + admin)
///     ├── /user                         (JWT)
///     │   ├── GET  /            PUT /
///     │   ├── GET  /search
///     │   └── GET  /:id         PUT /:id (admin)
///     ├── /posts
///     │   ├── GET  /                    (public)
///     │   ├── POST /                    (JWT, rest of the group too)
///     │   ├── GET  /feed
///     │   ├── GET  /user/me     GET /user/:userId
///     │   ├── GET  /:id   PUT /:id   DELETE /:id
///     │   └── POST /:id/like
///     ├── /comment                      (JWT)
///     │   ├── POST /
///     │   └── GET /:id   PUT /:id   DELETE /:id
///     ├── /comments/post/:postId        (JWT)
///     └── /admin                        (JWT + admin)
///         ├── GET /dashboard
///         └── GET /history
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication and admin role check (per-route basis)
pub fn build_router(state: AppState) -> Router {
    let jwt = || middleware::from_fn_with_state(state.clone(), jwt_auth_layer);
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin))
        .route("/forgotPassword", post(routes::auth::forgot_password))
        .route("/resetPassword", post(routes::auth::reset_password))
        .merge(
            Router::new()
                .route("/updateRoles", post(routes::auth::update_roles))
                .route_layer(admin())
                .route_layer(jwt()),
        );

    let user_routes = Router::new()
        .route("/", get(routes::users::user_me).put(routes::users::update_me))
        .route("/search", get(routes::users::search_users))
        .route("/:id", get(routes::users::get_user_by_id))
        .merge(
            Router::new()
                .route("/:id", put(routes::users::update_user))
                .route_layer(admin()),
        )
        .route_layer(jwt());

    let post_routes = Router::new()
        .route("/", get(routes::posts::get_all_posts))
        .merge(
            Router::new()
                .route("/", post(routes::posts::create_post))
                .route("/feed", get(routes::posts::get_feed))
                .route("/user/me", get(routes::posts::get_my_posts))
                .route("/user/:user_id", get(routes::posts::get_user_posts))
                .route(
                    "/:id",
                    get(routes::posts::get_post_by_id)
                        .put(routes::posts::update_post)
                        .delete(routes::posts::delete_post),
                )
                .route("/:id/like", post(routes::posts::toggle_like))
                .route_layer(jwt()),
        );

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route(
            "/:id",
            get(routes::comments::get_comment_by_id)
                .put(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route_layer(jwt());

    let comments_routes = Router::new()
        .route("/post/:post_id", get(routes::comments::get_comments_by_post_id))
        .route_layer(jwt());

    let admin_routes = Router::new()
        .route("/dashboard", get(routes::admin::dashboard))
        .route("/history", get(routes::admin::history))
        .route_layer(admin())
        .route_layer(jwt());

    let upload_routes = Router::new()
        .route("/upload", post(routes::upload::upload_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .route_layer(jwt());

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/posts", post_routes)
        .nest("/comment", comment_routes)
        .nest("/comments", comments_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(upload_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects [`AuthContext`] into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin gate; must run after [`jwt_auth_layer`]
///
/// Roles are re-read from the database so a revoked admin loses access
/// before their token expires.
async fn require_admin_layer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state.db, auth.user_id, Role::Admin).await?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sqlx::postgres::PgPoolOptions;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/devconnect_test".to_string()),
            "JWT_SECRET" => Some("test-secret-key-at-least-32-bytes-long".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_app_state_defaults() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/devconnect_test")
            .unwrap();

        let state = AppState::from_config(pool, test_config()).unwrap();

        assert!(state.storage.is_none());
        assert_eq!(state.jwt_secret(), "test-secret-key-at-least-32-bytes-long");
    }

    #[tokio::test]
    async fn test_router_builds() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/devconnect_test")
            .unwrap();

        let _router = build_router(AppState::new(pool, test_config()));
    }
}
