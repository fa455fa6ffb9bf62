//! The write path that keeps the blob store and the metadata store
//! consistent.
//!
//! Upload order is blob-before-row; delete order is row-before-blob. The
//! metadata row is authoritative for existence, so the only inconsistency
//! a crash can leave behind is an orphaned blob, never a row pointing at
//! bytes that were never written.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tokio::fs::File;
use uuid::Uuid;

use crate::blob::{self, BlobStore};
use crate::error::{Error, Result};
use crate::store::MetadataStore;
use crate::types::{Compression, Game, Replay};

/// A blob cleanup that failed after the authoritative row operation had
/// already succeeded. Callers log these; they never fail the request.
#[derive(Debug, Clone)]
pub struct CleanupWarning {
    pub path: String,
    pub reason: String,
}

/// An incoming multipart upload, already drained from the request body.
pub struct NewUpload {
    pub original_name: String,
    pub data: Bytes,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub struct ReplayCoordinator {
    store: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ReplayCoordinator {
    pub fn new(store: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    // Games

    pub fn list_games(&self, owner: Uuid) -> Result<Vec<Game>> {
        self.store.list_games(owner)
    }

    /// Create-by-name is idempotent: re-creating an existing name returns
    /// the existing game.
    pub fn create_game(&self, owner: Uuid, name: &str) -> Result<Game> {
        let game = Game {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner,
            created_at: Utc::now(),
            replay_count: 0,
        };
        let game = self.store.upsert_game(&game)?;
        tracing::info!("game {} ({:?}) for user {}", game.id, game.name, owner);
        Ok(game)
    }

    pub fn rename_game(&self, id: Uuid, owner: Uuid, name: &str) -> Result<()> {
        if !self.store.rename_game(id, owner, name)? {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Removes a game with every replay it owns. Replay rows cascade at
    /// the store; their blobs are reclaimed best-effort afterward, once
    /// the rows are authoritatively gone.
    pub async fn delete_game(&self, id: Uuid, owner: Uuid) -> Result<Vec<CleanupWarning>> {
        // Paths must be collected before the cascade erases them.
        let paths = self.store.list_replay_paths(id, owner)?;

        if !self.store.delete_game(id, owner)? {
            return Err(Error::NotFound);
        }

        tracing::info!("deleted game {} ({} blobs to reclaim)", id, paths.len());

        let mut warnings = Vec::new();
        for path in &paths {
            self.remove_blob(path, &mut warnings).await;
        }
        Ok(warnings)
    }

    // Replays

    pub fn list_replays(&self, game_id: Uuid, owner: Uuid, limit: i64) -> Result<Vec<Replay>> {
        self.store.list_replays(game_id, owner, limit)
    }

    pub fn get_replay(&self, id: Uuid, owner: Uuid) -> Result<Replay> {
        self.store.get_replay(id, owner)?.ok_or(Error::NotFound)
    }

    /// The upload state machine: validate, assign identity, persist the
    /// blob, persist the row. A failed row insert rolls the blob back; a
    /// failed blob write needs no cleanup because nothing else was
    /// written yet.
    pub async fn upload_replay(
        &self,
        owner: Uuid,
        game_id: Uuid,
        upload: NewUpload,
    ) -> Result<Replay> {
        // Scoped lookup: a game owned by someone else is indistinguishable
        // from a game that does not exist.
        self.store.get_game(game_id, owner)?.ok_or(Error::NotFound)?;

        // Identity is assigned before any I/O so the blob can be written
        // under its durable address before the row exists.
        let id = Uuid::new_v4();
        let file_path = blob::replay_rel_path(owner, game_id, id, &upload.original_name);

        self.blobs.put(&file_path, &upload.data).await?;

        let replay = Replay {
            id,
            title: upload.title.filter(|t| !t.is_empty()),
            original_name: upload.original_name,
            file_path: file_path.clone(),
            size_bytes: upload.data.len() as i64,
            uploaded_at: Utc::now(),
            compression: Compression::None,
            compressed: false,
            comment: upload.comment.filter(|c| !c.is_empty()),
            game_id,
            owner,
        };

        if let Err(err) = self.store.create_replay(&replay) {
            // Compensating action: without a row the blob must not
            // survive. Best-effort only; the insert error is what the
            // caller sees either way.
            if let Err(cleanup) = self.blobs.delete(&file_path).await {
                tracing::warn!("failed to roll back blob {}: {}", file_path, cleanup);
            }
            return Err(err);
        }

        tracing::info!(
            "uploaded replay {} ({} bytes) to game {}",
            replay.id,
            replay.size_bytes,
            game_id
        );
        Ok(replay)
    }

    /// Merge semantics: an empty or absent field leaves the stored value
    /// unchanged.
    pub fn update_replay(
        &self,
        id: Uuid,
        owner: Uuid,
        title: Option<String>,
        comment: Option<String>,
    ) -> Result<()> {
        let title = title.filter(|t| !t.is_empty());
        let comment = comment.filter(|c| !c.is_empty());

        if !self
            .store
            .update_replay(id, owner, title.as_deref(), comment.as_deref())?
        {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn delete_replay(&self, id: Uuid, owner: Uuid) -> Result<Vec<CleanupWarning>> {
        let file_path = self
            .store
            .delete_replay(id, owner)?
            .ok_or(Error::NotFound)?;

        tracing::info!("deleted replay {}", id);

        let mut warnings = Vec::new();
        self.remove_blob(&file_path, &mut warnings).await;
        Ok(warnings)
    }

    /// Resolves a replay's blob for streaming. A missing row and a
    /// missing blob are both NotFound; the latter means the stores have
    /// drifted, which is logged but not otherwise special.
    pub async fn open_replay_file(&self, id: Uuid, owner: Uuid) -> Result<(Replay, File, i64)> {
        let replay = self.get_replay(id, owner)?;

        let (file, size) = self.blobs.open(&replay.file_path).await.map_err(|err| {
            if matches!(err, crate::blob::BlobError::NotFound) {
                tracing::warn!("replay {} has no blob at {}", replay.id, replay.file_path);
            }
            err
        })?;

        Ok((replay, file, size))
    }

    async fn remove_blob(&self, path: &str, warnings: &mut Vec<CleanupWarning>) {
        match self.blobs.delete(path).await {
            // A concurrent delete may have won the race; "already gone"
            // is success for a removal.
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("failed to remove blob {}: {}", path, err);
                warnings.push(CleanupWarning {
                    path: path.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
}
