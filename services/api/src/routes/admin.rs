//! Admin-only listings and dashboard

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use super::parse_id;
use crate::{error::ApiResult, middleware::AdminUser, state::AppState};

pub async fn stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let stats = state.dashboard.stats().await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}

pub async fn all_registrations(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let registrations = state.registrations.list_all().await?;

    Ok(Json(json!({
        "success": true,
        "count": registrations.len(),
        "data": registrations,
    })))
}

pub async fn event_registrations(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let listed = state
        .registrations
        .list_for_event(parse_id(&event_id)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": listed.registrations.len(),
        "event": listed.event_title,
        "data": listed.registrations,
    })))
}

pub async fn users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let users = state.auth.list_users().await?;

    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "data": users,
    })))
}
