use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Tenancy boundary: every game and replay is owned
/// by exactly one user, and no query crosses that boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    #[serde(skip)]
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    /// Derived from the replays table on list queries, never stored.
    #[serde(default)]
    pub replay_count: i64,
}

/// How the stored file bytes are encoded on disk. Uploads are stored
/// verbatim today, so this is always `None`; the column exists so old
/// rows stay readable if transparent compression lands later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "gzip" => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub original_name: String,
    /// Relative blob address under the storage root:
    /// `{owner}/{game}/{id}{ext}`. Never exposed to clients.
    #[serde(skip)]
    pub file_path: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub compression: Compression,
    pub compressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub game_id: Uuid,
    #[serde(skip)]
    pub owner: Uuid,
}
