mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use uuid::Uuid;

use crate::error::Result;
use crate::types::{Game, Replay, User};

/// MetadataStore defines the database interface.
///
/// Every game/replay operation takes the owning tenant id and scopes its
/// query with it; a row owned by someone else behaves exactly like a row
/// that does not exist.
pub trait MetadataStore: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    fn get_user_by_login(&self, login: &str) -> Result<Option<User>>;

    // Game operations
    fn upsert_game(&self, game: &Game) -> Result<Game>;
    fn list_games(&self, owner: Uuid) -> Result<Vec<Game>>;
    fn get_game(&self, id: Uuid, owner: Uuid) -> Result<Option<Game>>;
    fn rename_game(&self, id: Uuid, owner: Uuid, name: &str) -> Result<bool>;
    /// Deletes the game row; replay rows cascade at the schema level.
    /// Blob reclamation is the coordinator's job.
    fn delete_game(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    // Replay operations
    fn create_replay(&self, replay: &Replay) -> Result<()>;
    fn get_replay(&self, id: Uuid, owner: Uuid) -> Result<Option<Replay>>;
    fn list_replays(&self, game_id: Uuid, owner: Uuid, limit: i64) -> Result<Vec<Replay>>;
    /// Merge semantics: a `None` field leaves the stored value unchanged.
    /// Returns false when no row matched `(id, owner)`.
    fn update_replay(
        &self,
        id: Uuid,
        owner: Uuid,
        title: Option<&str>,
        comment: Option<&str>,
    ) -> Result<bool>;
    /// Deletes the row and returns its blob path, or None if no row
    /// matched `(id, owner)`.
    fn delete_replay(&self, id: Uuid, owner: Uuid) -> Result<Option<String>>;
    fn list_replay_paths(&self, game_id: Uuid, owner: Uuid) -> Result<Vec<String>>;

    fn close(&self) -> Result<()>;
}
