//! Admin-facing activity log viewer.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppError,
    models::{activity::Activity, PaginatedResponse, PaginationQuery},
    repositories::activity::{self as activity_repo, ActivityFilters},
    state::AppState,
};

use super::require_admin;

#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub item_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub item_type: String,
    pub item_id: Option<String>,
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            action: activity.action.as_str().to_string(),
            item_type: activity.item_type.as_str().to_string(),
            item_id: activity.item_id,
            metadata: activity.metadata.map(|value| value.0),
            ip_address: activity.ip_address,
            created_at: activity.created_at,
        }
    }
}

pub async fn list_activities(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<PaginatedResponse<ActivityResponse>>, AppError> {
    require_admin(&state, &headers)?;

    let pagination = PaginationQuery {
        limit: query.limit.unwrap_or_else(|| PaginationQuery::default().limit),
        offset: query.offset.unwrap_or(0),
    };
    let limit = pagination.limit();
    let offset = pagination.offset();
    let filters = ActivityFilters {
        user_id: query.user_id,
        action: query.action,
        item_type: query.item_type,
    };

    let activities = activity_repo::list_activities(&state.pool, &filters, limit, offset).await?;
    let total = activity_repo::count_activities(&state.pool, &filters).await?;

    Ok(Json(PaginatedResponse::new(
        activities.into_iter().map(ActivityResponse::from).collect(),
        total,
        limit,
        offset,
    )))
}
