use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Shared by create-game and rename-game. The name is optional at the
/// serde layer so a missing field surfaces as a 400 from validation
/// rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct GameNameRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListReplaysParams {
    /// Kept as a raw string: garbage and non-positive values fall back
    /// to the default instead of failing the request.
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplayFileParams {
    /// Caller override for the disposition; truthy forces a download.
    #[serde(default)]
    pub download: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedReplayResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
