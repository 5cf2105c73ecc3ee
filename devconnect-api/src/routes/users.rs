/// Profile endpoints
///
/// # Endpoints
///
/// - `GET /api/user` - Caller's profile
/// - `PUT /api/user` - Update the caller's profile
/// - `GET /api/user/search` - Search other users
/// - `GET /api/user/:id` - Public profile
/// - `PUT /api/user/:id` - Update any profile (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use devconnect_shared::{
    auth::middleware::AuthContext,
    models::{
        auth::AuthRecord,
        pagination::{PageParams, PaginatedResponse, DEFAULT_LIMIT},
        user::{ProfileView, SearchUser, UpdateProfile, UserProfile},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Social links in an update; each one is optional
#[derive(Debug, Default, Deserialize)]
pub struct SocialUpdate {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

/// Profile update request; absent fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 500, message = "Skills must be at most 500 characters"))]
    pub skills: Option<String>,

    pub social: Option<SocialUpdate>,

    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        let social = req.social.unwrap_or_default();

        UpdateProfile {
            name: req.name,
            bio: req.bio,
            skills: req.skills,
            github: social.github,
            linkedin: social.linkedin,
            twitter: social.twitter,
            website: social.website,
            avatar: req.avatar,
        }
    }
}

/// Search query string
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    fn page_params(&self) -> PageParams {
        PageParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_LIMIT))
    }
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Malformed ids cannot name a user, so they answer 404 like unknown ones
fn profile_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| user_not_found())
}

/// Caller's profile, with roles from the access token
pub async fn user_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileView>> {
    let profile = UserProfile::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(ProfileView::new(profile, auth.roles)))
}

/// Update the caller's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileView>> {
    req.validate()?;

    let profile = UserProfile::update(&state.db, auth.user_id, req.into())
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(ProfileView::new(profile, auth.roles)))
}

/// Update any user's profile (admin only)
///
/// The view carries the target account's roles.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileView>> {
    req.validate()?;
    let id = profile_id(&id)?;

    let profile = UserProfile::update(&state.db, id, req.into())
        .await?
        .ok_or_else(user_not_found)?;

    let roles = AuthRecord::find_by_id(&state.db, id)
        .await?
        .map(|auth| auth.roles)
        .unwrap_or_default();

    tracing::info!(user_id = %id, "Profile updated by admin");

    Ok(Json(ProfileView::new(profile, roles)))
}

/// Search other users by name, bio or skills
pub async fn search_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PaginatedResponse<SearchUser>>> {
    let params = query.page_params();
    let search = query.search.as_deref().unwrap_or("");

    let (profiles, total) = UserProfile::search(&state.db, auth.user_id, search, params).await?;
    let items = profiles.into_iter().map(SearchUser::from).collect();

    Ok(Json(PaginatedResponse::new(items, params, total)))
}

/// Public profile of any user; roles are omitted
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileView>> {
    let profile = UserProfile::find_by_id(&state.db, profile_id(&id)?)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(ProfileView::new(profile, Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_flattens_social() {
        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "bio": "Rustacean",
            "social": { "github": "https://github.com/ada" }
        }))
        .unwrap();

        let update = UpdateProfile::from(req);
        assert_eq!(update.bio.as_deref(), Some("Rustacean"));
        assert_eq!(update.github.as_deref(), Some("https://github.com/ada"));
        assert!(update.name.is_none());
        assert!(update.twitter.is_none());
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let update = UpdateProfile::from(UpdateProfileRequest::default());
        assert!(update.is_empty());
    }

    #[test]
    fn test_search_query_pages() {
        let query = SearchQuery {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };

        assert_eq!(query.page_params(), PageParams::new(1, 100));
        assert_eq!(SearchQuery::default().page_params(), PageParams::default());
    }

    #[test]
    fn test_malformed_profile_id_is_not_found() {
        assert!(matches!(profile_id("abc"), Err(ApiError::NotFound(_))));
    }
}
