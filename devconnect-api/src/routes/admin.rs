/// Admin analytics
///
/// Both endpoints sit behind the JWT and admin-role layers.
///
/// - `GET /api/admin/dashboard` - Totals, last-week counts and recent activity
/// - `GET /api/admin/history` - Daily creation counts and role distribution

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use devconnect_shared::models::{
    analytics::{self, CountedTable, DailyCount, RoleCount},
    comment::Comment,
    post::{Post, PostView},
    user::{RecentUser, UserProfile},
};
use serde::{Deserialize, Serialize};

/// Posts per recent-activity list
const ACTIVITY_POSTS: i64 = 6;

/// Users in the recent-activity list
const ACTIVITY_USERS: i64 = 5;

/// Window for the "new" counters
const NEW_WINDOW_DAYS: i64 = 7;

/// Site-wide totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub new_users: i64,
    pub new_posts: i64,
    pub new_comments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub posts: Vec<PostView>,
    pub users: Vec<RecentUser>,
    pub most_liked_posts: Vec<PostView>,
    pub most_commented_posts: Vec<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub overview: Overview,
    pub recent_activity: RecentActivity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub users_over_time: Vec<DailyCount>,
    pub posts_over_time: Vec<DailyCount>,
    pub comments_over_time: Vec<DailyCount>,
    pub role_distribution: Vec<RoleCount>,
}

/// Dashboard statistics
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let db = &state.db;
    let since = Utc::now() - Duration::days(NEW_WINDOW_DAYS);

    let (total_users, total_posts, total_comments, new_users, new_posts, new_comments) = tokio::try_join!(
        UserProfile::count(db),
        Post::count(db),
        Comment::count(db),
        UserProfile::count_since(db, since),
        Post::count_since(db, since),
        Comment::count_since(db, since),
    )?;

    let (posts, users, most_liked_posts, most_commented_posts) = tokio::try_join!(
        Post::recent_views(db, ACTIVITY_POSTS),
        UserProfile::recent(db, ACTIVITY_USERS),
        Post::most_liked(db, ACTIVITY_POSTS),
        Post::most_commented(db, ACTIVITY_POSTS),
    )?;

    Ok(Json(DashboardResponse {
        overview: Overview {
            total_users,
            total_posts,
            total_comments,
            new_users,
            new_posts,
            new_comments,
        },
        recent_activity: RecentActivity {
            posts,
            users,
            most_liked_posts,
            most_commented_posts,
        },
    }))
}

/// Growth over time and role distribution
///
/// Any failure answers 500 with a fixed message; the cause is logged.
pub async fn history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    let db = &state.db;

    let (users_over_time, posts_over_time, comments_over_time, role_distribution) = tokio::try_join!(
        analytics::daily_counts(db, CountedTable::Users),
        analytics::daily_counts(db, CountedTable::Posts),
        analytics::daily_counts(db, CountedTable::Comments),
        analytics::role_distribution(db),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to load historical data");
        ApiError::InternalError("Error fetching historical data".to_string())
    })?;

    Ok(Json(HistoryResponse {
        users_over_time,
        posts_over_time,
        comments_over_time,
        role_distribution,
    }))
}
