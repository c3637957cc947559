use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::notification::NotificationPage;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query parameters for the notification list.
#[derive(Deserialize, Debug)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Falls back to the cached user's account when omitted.
    pub account_id: Option<Uuid>,
}

/// Query parameters for marking all notifications read.
#[derive(Deserialize, Debug)]
pub struct ReadAllQuery {
    pub account_id: Option<Uuid>,
}

fn resolve_account(state: &AppState, requested: Option<Uuid>) -> Result<Uuid> {
    requested
        .or_else(|| state.store.user().map(|user| user.id))
        .ok_or(AuthError::Unauthorized)
}

/// Handles listing one page of notifications.
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<NotificationPage>> {
    let account_id = resolve_account(&state, query.account_id)?;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let notifications = state
        .gateway
        .list_notifications(account_id, page, page_size)
        .await?;
    Ok(Json(notifications))
}

/// Handles marking one notification as read.
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.gateway.mark_notification_read(notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handles marking all notifications of an account as read.
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Query(query): Query<ReadAllQuery>,
) -> Result<StatusCode> {
    let account_id = resolve_account(&state, query.account_id)?;
    state.gateway.mark_all_notifications_read(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
