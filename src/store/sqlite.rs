use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::MetadataStore;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::{Compression, Game, Replay, User};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|e| {
        tracing::error!("Invalid uuid in database: '{}' - {}", s, e);
        Uuid::nil()
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn replay_from_row(row: &Row<'_>) -> rusqlite::Result<Replay> {
    Ok(Replay {
        id: parse_uuid(&row.get::<_, String>(0)?),
        game_id: parse_uuid(&row.get::<_, String>(1)?),
        owner: parse_uuid(&row.get::<_, String>(2)?),
        title: row.get(3)?,
        comment: row.get(4)?,
        original_name: row.get(5)?,
        file_path: row.get(6)?,
        size_bytes: row.get(7)?,
        compression: Compression::parse(&row.get::<_, String>(8)?),
        compressed: row.get(9)?,
        uploaded_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

const REPLAY_COLUMNS: &str = "id, game_id, user_id, title, comment, original_name, file_path, \
     size_bytes, compression, compressed, uploaded_at";

impl MetadataStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, login, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.login,
                    user.password_hash,
                    format_datetime(&user.created_at),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyExists
                } else {
                    Error::from(e)
                }
            })?;
        Ok(())
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, login, password_hash, created_at FROM users WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(User {
                    id: parse_uuid(&row.get::<_, String>(0)?),
                    login: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = ?1",
            params![login],
            |row| {
                Ok(User {
                    id: parse_uuid(&row.get::<_, String>(0)?),
                    login: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Game operations

    fn upsert_game(&self, game: &Game) -> Result<Game> {
        // Re-creating a game under the same name returns the existing row;
        // the no-op DO UPDATE makes RETURNING fire on the conflict path too.
        let conn = self.conn();
        let owner = game.owner;
        conn.query_row(
            "INSERT INTO games (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, name) DO UPDATE SET name = excluded.name
             RETURNING id, name, created_at",
            params![
                game.id.to_string(),
                owner.to_string(),
                game.name,
                format_datetime(&game.created_at),
            ],
            |row| {
                Ok(Game {
                    id: parse_uuid(&row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    owner,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    replay_count: 0,
                })
            },
        )
        .map_err(Error::from)
    }

    fn list_games(&self, owner: Uuid) -> Result<Vec<Game>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT g.id, g.name, g.created_at, COUNT(r.id)
             FROM games g
             LEFT JOIN replays r ON r.game_id = g.id
             WHERE g.user_id = ?1
             GROUP BY g.id, g.name, g.created_at
             ORDER BY g.created_at DESC",
        )?;

        let rows = stmt.query_map(params![owner.to_string()], |row| {
            Ok(Game {
                id: parse_uuid(&row.get::<_, String>(0)?),
                name: row.get(1)?,
                owner,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
                replay_count: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_game(&self, id: Uuid, owner: Uuid) -> Result<Option<Game>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at FROM games WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), owner.to_string()],
            |row| {
                Ok(Game {
                    id: parse_uuid(&row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    owner,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    replay_count: 0,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn rename_game(&self, id: Uuid, owner: Uuid, name: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE games SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            params![name, id.to_string(), owner.to_string()],
        )?;
        Ok(rows > 0)
    }

    fn delete_game(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM games WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        Ok(rows > 0)
    }

    // Replay operations

    fn create_replay(&self, replay: &Replay) -> Result<()> {
        self.conn().execute(
            "INSERT INTO replays (id, game_id, user_id, title, comment, original_name, \
             file_path, size_bytes, compression, compressed, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                replay.id.to_string(),
                replay.game_id.to_string(),
                replay.owner.to_string(),
                replay.title,
                replay.comment,
                replay.original_name,
                replay.file_path,
                replay.size_bytes,
                replay.compression.as_str(),
                replay.compressed,
                format_datetime(&replay.uploaded_at),
            ],
        )?;
        Ok(())
    }

    fn get_replay(&self, id: Uuid, owner: Uuid) -> Result<Option<Replay>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {REPLAY_COLUMNS} FROM replays WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), owner.to_string()],
            replay_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_replays(&self, game_id: Uuid, owner: Uuid, limit: i64) -> Result<Vec<Replay>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPLAY_COLUMNS} FROM replays
             WHERE game_id = ?1 AND user_id = ?2
             ORDER BY uploaded_at DESC
             LIMIT ?3"
        ))?;

        let rows = stmt.query_map(
            params![game_id.to_string(), owner.to_string(), limit],
            replay_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_replay(
        &self,
        id: Uuid,
        owner: Uuid,
        title: Option<&str>,
        comment: Option<&str>,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE replays
             SET title = COALESCE(?1, title), comment = COALESCE(?2, comment)
             WHERE id = ?3 AND user_id = ?4",
            params![title, comment, id.to_string(), owner.to_string()],
        )?;
        Ok(rows > 0)
    }

    fn delete_replay(&self, id: Uuid, owner: Uuid) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "DELETE FROM replays WHERE id = ?1 AND user_id = ?2 RETURNING file_path",
            params![id.to_string(), owner.to_string()],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_replay_paths(&self, game_id: Uuid, owner: Uuid) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT file_path FROM replays WHERE game_id = ?1 AND user_id = ?2")?;

        let rows = stmt.query_map(params![game_id.to_string(), owner.to_string()], |row| {
            row.get(0)
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
