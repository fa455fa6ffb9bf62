use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireTenant;
use crate::server::AppState;
use crate::server::dto::{GameNameRequest, MessageResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{parse_id, validate_game_name};

pub async fn list_games(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let games = state.coordinator.list_games(tenant)?;

    Ok(Json(ApiResponse::success(games)))
}

pub async fn create_game(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Json(req): Json<GameNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.as_deref().unwrap_or_default();
    validate_game_name(name)?;

    let game = state.coordinator.create_game(tenant, name)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(game))))
}

pub async fn update_game(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<GameNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = parse_id(&game_id, "game id")?;
    let name = req.name.as_deref().unwrap_or_default();
    validate_game_name(name)?;

    state.coordinator.rename_game(game_id, tenant, name)?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "updated",
    })))
}

pub async fn delete_game(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = parse_id(&game_id, "game id")?;

    // Cleanup warnings are already logged by the coordinator; the rows
    // are gone, so the delete reports success regardless.
    state.coordinator.delete_game(game_id, tenant).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "deleted",
    })))
}
