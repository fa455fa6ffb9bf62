use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{validate_login, validate_password};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_login(&req.login)?;
    validate_password(&req.password)?;

    let token = state.auth.register(&req.login, &req.password)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TokenResponse { token })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.login.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("login and password are required"));
    }

    let token = state.auth.login(&req.login, &req.password)?;

    Ok(Json(ApiResponse::success(TokenResponse { token })))
}
