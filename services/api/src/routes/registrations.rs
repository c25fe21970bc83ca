//! Student registration endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::parse_id;
use crate::{error::ApiResult, middleware::StudentUser, state::AppState};

pub async fn register_for_event(
    StudentUser(student): StudentUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let registration = state
        .registrations
        .register(student.id, parse_id(&event_id)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Successfully registered for the event",
            "data": registration,
        })),
    ))
}

pub async fn my_registrations(
    StudentUser(student): StudentUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let registrations = state.registrations.list_mine(student.id).await?;

    Ok(Json(json!({
        "success": true,
        "count": registrations.len(),
        "data": registrations,
    })))
}

pub async fn cancel_registration(
    StudentUser(student): StudentUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .registrations
        .cancel(student.id, parse_id(&event_id)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration cancelled successfully",
    })))
}
