use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found")]
    NotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

impl From<BlobError> for crate::error::Error {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound => crate::error::Error::NotFound,
            BlobError::Io(e) => crate::error::Error::Io(e),
        }
    }
}

/// BlobStore holds the raw uploaded bytes, addressed by the relative
/// paths recorded in the metadata store. It keeps no metadata of its own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, rel_path: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Opens a stored blob for streaming and returns its byte length.
    async fn open(&self, rel_path: &str) -> Result<(File, i64), BlobError>;

    /// Removes a blob. Returns false when the file was already gone,
    /// which callers treat as success.
    async fn delete(&self, rel_path: &str) -> Result<bool, BlobError>;

    async fn exists(&self, rel_path: &str) -> bool;
}

/// Filesystem-backed blob store rooted at `{data_dir}/replays`.
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("replays"),
        }
    }

    fn full_path(&self, rel_path: &str) -> PathBuf {
        self.base_path.join(rel_path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, rel_path: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.full_path(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        Ok(())
    }

    async fn open(&self, rel_path: &str) -> Result<(File, i64), BlobError> {
        let path = self.full_path(rel_path);
        let file = File::open(&path).await.map_err(BlobError::from_io)?;

        let metadata = file.metadata().await?;
        let size = metadata.len() as i64;

        Ok((file, size))
    }

    async fn delete(&self, rel_path: &str) -> Result<bool, BlobError> {
        let path = self.full_path(rel_path);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    async fn exists(&self, rel_path: &str) -> bool {
        self.full_path(rel_path).exists()
    }
}

/// Builds a replay's relative blob address: `{owner}/{game}/{id}{ext}`.
/// The per-tenant/per-game prefix keeps concurrent writers from ever
/// colliding on a path.
#[must_use]
pub fn replay_rel_path(owner: Uuid, game_id: Uuid, replay_id: Uuid, original_name: &str) -> String {
    match sanitized_extension(original_name) {
        Some(ext) => format!("{owner}/{game_id}/{replay_id}.{ext}"),
        None => format!("{owner}/{game_id}/{replay_id}"),
    }
}

const MAX_EXTENSION_LEN: usize = 10;

/// Extension of the uploaded filename, lowercased and restricted to
/// ascii-alphanumeric so a hostile filename cannot influence the path.
#[must_use]
pub fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_put_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        let rel = "u1/g1/r1.dem";
        storage.put(rel, b"demo bytes").await.unwrap();
        assert!(storage.exists(rel).await);

        let (mut file, size) = storage.open(rel).await.unwrap();
        assert_eq!(size, 10);

        let mut content = Vec::new();
        file.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"demo bytes");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        assert!(matches!(
            storage.open("u1/g1/missing.dem").await,
            Err(BlobError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_reports_already_gone() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        let rel = "u1/g1/r1.dem";
        storage.put(rel, b"x").await.unwrap();

        assert!(storage.delete(rel).await.unwrap());
        assert!(!storage.delete(rel).await.unwrap());
        assert!(!storage.exists(rel).await);
    }

    #[test]
    fn test_replay_rel_path_keeps_extension() {
        let owner = Uuid::new_v4();
        let game = Uuid::new_v4();
        let replay = Uuid::new_v4();

        let path = replay_rel_path(owner, game, replay, "demo.DEM");
        assert_eq!(path, format!("{owner}/{game}/{replay}.dem"));
    }

    #[test]
    fn test_replay_rel_path_rejects_hostile_extension() {
        let owner = Uuid::new_v4();
        let game = Uuid::new_v4();
        let replay = Uuid::new_v4();

        let path = replay_rel_path(owner, game, replay, "evil.d/../m");
        assert_eq!(path, format!("{owner}/{game}/{replay}"));

        let path = replay_rel_path(owner, game, replay, "noext");
        assert_eq!(path, format!("{owner}/{game}/{replay}"));
    }

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("a.mp4").as_deref(), Some("mp4"));
        assert_eq!(sanitized_extension("a.tar.gz").as_deref(), Some("gz"));
        assert_eq!(sanitized_extension("noext"), None);
        assert_eq!(sanitized_extension("weird.<>!"), None);
        assert_eq!(sanitized_extension("long.aaaaaaaaaaaaaaa"), None);
    }
}
