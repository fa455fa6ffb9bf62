use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use super::{auth, games, replays};
use crate::auth::AuthService;
use crate::coordinator::ReplayCoordinator;

/// Uploads are whole-request bodies; replays of modern games run large.
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024; // 1 GiB

/// Everything the handlers need, wired once at startup.
pub struct AppState {
    pub auth: AuthService,
    pub coordinator: ReplayCoordinator,
    /// When set, requests without any credential resolve to this tenant.
    /// For single-user deployments only; requests that do present a
    /// credential are still validated.
    pub default_tenant: Option<Uuid>,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Authorization, Content-Type"),
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(log_request))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Games
        .route("/games", get(games::list_games))
        .route("/games", post(games::create_game))
        .route("/games/{game_id}", put(games::update_game))
        .route("/games/{game_id}", delete(games::delete_game))
        .route("/games/{game_id}/replays", get(replays::list_replays))
        .route("/games/{game_id}/replays", post(replays::create_replay))
        // Replays
        .route("/replays/{replay_id}", get(replays::get_replay))
        .route("/replays/{replay_id}", put(replays::update_replay))
        .route("/replays/{replay_id}", delete(replays::delete_replay))
        .route("/replays/{replay_id}/file", get(replays::get_replay_file))
}
