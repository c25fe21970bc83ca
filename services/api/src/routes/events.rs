//! Event endpoints; reads for everyone signed in, writes for admins

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::parse_id;
use crate::{
    error::ApiResult,
    middleware::{AdminUser, CurrentUser},
    models::{CreateEventRequest, UpdateEventRequest},
    state::AppState,
};

pub async fn list_events(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let events = state.events.list().await?;

    Ok(Json(json!({
        "success": true,
        "count": events.len(),
        "data": events,
    })))
}

pub async fn get_event(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let event = state.events.get(parse_id(&id)?).await?;

    Ok(Json(json!({ "success": true, "data": event })))
}

pub async fn create_event(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let event = state.events.create(request, admin.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Event created successfully",
            "data": event,
        })),
    ))
}

pub async fn update_event(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let event = state.events.update(id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Event updated successfully",
        "data": event,
    })))
}

pub async fn delete_event(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.events.delete(parse_id(&id)?).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Event and associated registrations deleted successfully",
    })))
}
