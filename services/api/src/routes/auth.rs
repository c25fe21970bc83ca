//! Registration, login and current-user endpoints

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::ApiResult,
    middleware::CurrentUser,
    models::{LoginRequest, RegisterRequest, UserSummary},
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let response = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": response,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let response = state.auth.login(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": response,
    })))
}

pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": { "user": UserSummary::from(&user) },
    }))
}
