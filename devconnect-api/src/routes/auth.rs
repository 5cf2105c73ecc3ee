/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Register a new account
/// - `POST /api/auth/signin` - Exchange credentials for an access token
/// - `POST /api/auth/forgotPassword` - Email a password reset link
/// - `POST /api/auth/resetPassword` - Redeem a reset link
/// - `POST /api/auth/updateRoles` - Replace an account's roles (admin)

use super::{parse_id, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use devconnect_shared::{
    auth::{
        jwt::{self, Claims, JwtError, TokenType},
        password,
        reset::hash_reset_token,
    },
    models::{
        auth::{AuthRecord, CreateAuth},
        reset_token::{ResetToken, ResetTokenError},
        role::{Role, RoleRecord},
        user::CreateProfile,
    },
    services::email::password_reset_email,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

const INVALID_RESET_TOKEN: &str = "Invalid reset token.";

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password policy separately
    pub password: String,

    /// Role codes; defaults to `[101]`
    pub roles: Option<Vec<i32>>,
}

/// Signin request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username_or_email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Signin response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    /// HS256 access token, valid for 24 hours
    pub access_token: String,
}

/// Forgot password request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username_or_email: String,
}

/// Reset password request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    pub new_password: String,
}

/// Update roles request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolesRequest {
    pub user_id: String,
    pub roles: Vec<i32>,
}

/// Update roles response
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRolesResponse {
    pub message: String,
    pub roles: Vec<i32>,
}

fn check_password_policy(field: &str, value: &str) -> ApiResult<()> {
    password::validate_password_policy(value)
        .map_err(|message| ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)]))
}

/// Register a new account
///
/// Creates the auth record and an empty profile with the same id in one
/// transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Username or email taken, or an unknown role code
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;
    check_password_policy("password", &req.password)?;

    if AuthRecord::username_exists(&state.db, &req.username).await? {
        return Err(ApiError::BadRequest("Failed! Username is already in use!".to_string()));
    }

    if AuthRecord::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::BadRequest("Failed! Email is already in use!".to_string()));
    }

    let roles = match req.roles {
        Some(roles) if !roles.is_empty() => {
            let roles = Role::dedup_codes(roles);
            let existing = RoleRecord::existing_codes(&state.db, &roles).await?;
            if let Some(missing) = roles.iter().find(|code| !existing.contains(code)) {
                return Err(ApiError::BadRequest(format!(
                    "Failed! Role {} does not exist!",
                    missing
                )));
            }
            roles
        }
        _ => vec![Role::User.code()],
    };

    let password_hash = password::hash_password(&req.password)?;

    let (auth, _) = AuthRecord::register(
        &state.db,
        CreateAuth {
            username: req.username,
            email: req.email,
            password_hash,
            roles,
        },
        CreateProfile::default(),
    )
    .await?;

    info!(user_id = %auth.id, username = %auth.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully!")),
    ))
}

/// Sign in with a username or email
///
/// # Errors
///
/// - `404 Not Found`: No matching account
/// - `401 Unauthorized`: Wrong password
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<Json<SigninResponse>> {
    req.validate()?;

    let auth = AuthRecord::find_by_username_or_email(&state.db, &req.username_or_email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User Not Found.".to_string()))?;

    if !password::verify_password(&req.password, &auth.password_hash)? {
        warn!(user_id = %auth.id, "Sign-in with invalid password");
        return Err(ApiError::Unauthorized("Invalid Password!".to_string()));
    }

    let claims = Claims::new(auth.id, auth.username, auth.email, auth.roles, TokenType::Access);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(SigninResponse { access_token }))
}

/// Email a password reset link
///
/// The link carries a one-hour reset token; only its SHA-256 digest is
/// stored.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let auth = AuthRecord::find_by_username_or_email(&state.db, &req.username_or_email)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No account found with that username or email.".to_string())
        })?;

    let claims = Claims::new(
        auth.id,
        auth.username.clone(),
        auth.email.clone(),
        auth.roles.clone(),
        TokenType::PasswordReset,
    );
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    let now = Utc::now();
    let purged = ResetToken::purge_expired(&state.db, now).await?;
    if purged > 0 {
        tracing::debug!(count = purged, "Purged expired reset tokens");
    }

    let expires_at = now + TokenType::PasswordReset.default_expiration();
    ResetToken::create(&state.db, &hash_reset_token(&token), auth.id, expires_at).await?;

    let email = password_reset_email(&auth.email, &state.config.auth.frontend_url, &token);
    state.mailer.send(email).await?;

    info!(user_id = %auth.id, "Password reset email sent");

    Ok(Json(MessageResponse::new("Password reset email sent successfully.")))
}

/// Redeem a password reset link
///
/// A token works once and only before it expires.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown, expired or already used token
/// - `422 Unprocessable Entity`: New password violates the policy
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;
    check_password_policy("newPassword", &req.new_password)?;

    let stored = ResetToken::find_by_hash(&state.db, &hash_reset_token(&req.token))
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_RESET_TOKEN.to_string()))?;

    stored.check_usable(Utc::now())?;

    let claims = jwt::validate_reset_token(&req.token, state.jwt_secret()).map_err(|e| match e {
        JwtError::Expired => ApiError::from(ResetTokenError::Expired),
        _ => ApiError::BadRequest(INVALID_RESET_TOKEN.to_string()),
    })?;

    if claims.sub != stored.user_id {
        return Err(ApiError::BadRequest(INVALID_RESET_TOKEN.to_string()));
    }

    if AuthRecord::find_by_id(&state.db, stored.user_id).await?.is_none() {
        return Err(ApiError::BadRequest(INVALID_RESET_TOKEN.to_string()));
    }

    let password_hash = password::hash_password(&req.new_password)?;

    let mut tx = state.db.begin().await?;

    if !ResetToken::mark_used(&mut *tx, stored.id).await? {
        return Err(ResetTokenError::AlreadyUsed.into());
    }

    if !AuthRecord::update_password(&mut *tx, stored.user_id, &password_hash).await? {
        return Err(ApiError::BadRequest(INVALID_RESET_TOKEN.to_string()));
    }

    tx.commit().await?;

    info!(user_id = %stored.user_id, "Password reset");

    Ok(Json(MessageResponse::new("Password has been reset successfully.")))
}

/// Replace the role codes of an account (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: Empty or unknown role codes, or a malformed id
/// - `404 Not Found`: Account does not exist
pub async fn update_roles(
    State(state): State<AppState>,
    Json(req): Json<UpdateRolesRequest>,
) -> ApiResult<Json<UpdateRolesResponse>> {
    if req.roles.is_empty() {
        return Err(ApiError::BadRequest("At least one role must be provided".to_string()));
    }

    if !Role::all_valid(&req.roles) {
        return Err(ApiError::BadRequest("Invalid role values provided".to_string()));
    }

    let user_id = parse_id(&req.user_id, "Invalid userId")?;
    let roles = Role::dedup_codes(req.roles);

    let auth = AuthRecord::update_roles(&state.db, user_id, &roles)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %auth.id, roles = ?auth.roles, "User roles updated");

    Ok(Json(UpdateRolesResponse {
        message: "User roles updated successfully".to_string(),
        roles: auth.roles,
    }))
}
