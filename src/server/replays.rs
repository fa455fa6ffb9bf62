use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::auth::RequireTenant;
use crate::blob::sanitized_extension;
use crate::coordinator::NewUpload;
use crate::server::AppState;
use crate::server::dto::{
    CreatedReplayResponse, ListReplaysParams, MessageResponse, ReplayFileParams,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{parse_id, parse_limit};
use crate::types::Replay;

/// Extensions browsers can play natively; everything else downloads.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "ogv", "mov", "avi", "mkv", "m4v"];

pub async fn list_replays(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Query(params): Query<ListReplaysParams>,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = parse_id(&game_id, "game id")?;
    let limit = parse_limit(params.limit.as_deref());

    let replays = state.coordinator.list_replays(game_id, tenant, limit)?;

    Ok(Json(ApiResponse::success(replays)))
}

pub async fn get_replay(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(replay_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let replay_id = parse_id(&replay_id, "replay id")?;

    let replay = state.coordinator.get_replay(replay_id, tenant)?;

    Ok(Json(ApiResponse::success(replay)))
}

pub async fn create_replay(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let game_id = parse_id(&game_id, "game id")?;

    let mut file: Option<(String, Bytes)> = None;
    let mut title = None;
    let mut comment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("replay").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("failed to read file part"))?;
                file = Some((original_name, data));
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::bad_request("failed to read title"))?,
                );
            }
            "comment" => {
                comment = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::bad_request("failed to read comment"))?,
                );
            }
            _ => {}
        }
    }

    let (original_name, data) = file.ok_or_else(|| ApiError::bad_request("file is required"))?;

    let replay = state
        .coordinator
        .upload_replay(
            tenant,
            game_id,
            NewUpload {
                original_name,
                data,
                title,
                comment,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedReplayResponse { id: replay.id })),
    ))
}

pub async fn update_replay(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(replay_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let replay_id = parse_id(&replay_id, "replay id")?;

    let mut title = None;
    let mut comment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("malformed form body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|_| ApiError::bad_request("malformed form body"))?;
        match name.as_str() {
            "title" => title = Some(value),
            "comment" => comment = Some(value),
            _ => {}
        }
    }

    state
        .coordinator
        .update_replay(replay_id, tenant, title, comment)?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "updated",
    })))
}

pub async fn delete_replay(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(replay_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let replay_id = parse_id(&replay_id, "replay id")?;

    state.coordinator.delete_replay(replay_id, tenant).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "deleted",
    })))
}

pub async fn get_replay_file(
    RequireTenant(tenant): RequireTenant,
    State(state): State<Arc<AppState>>,
    Path(replay_id): Path<String>,
    Query(params): Query<ReplayFileParams>,
) -> Result<Response, ApiError> {
    let replay_id = parse_id(&replay_id, "replay id")?;

    let (replay, file, size) = state.coordinator.open_replay_file(replay_id, tenant).await?;

    let mime = mime_guess::from_path(&replay.original_name).first_or_octet_stream();
    let disposition = content_disposition(&replay, params.download.as_deref());

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, size)
        .header(header::ACCEPT_RANGES, "bytes")
        // Replay bytes are immutable once uploaded, so clients may cache
        // them for as long as they like.
        .header(header::CACHE_CONTROL, "private, max-age=31536000, immutable")
        .body(body)
        .map_err(|_| ApiError::internal("failed to build response"))
}

fn is_video(original_name: &str) -> bool {
    sanitized_extension(original_name)
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Videos render inline so `<video>` tags can stream them; everything
/// else is a download. A `download` query parameter overrides either way.
fn content_disposition(replay: &Replay, download: Option<&str>) -> String {
    let attachment = match download {
        Some(value) => !matches!(value, "0" | "false"),
        None => !is_video(&replay.original_name),
    };

    let kind = if attachment { "attachment" } else { "inline" };
    format!("{kind}; filename={}", replay.original_name)
}
