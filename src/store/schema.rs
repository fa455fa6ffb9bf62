pub const SCHEMA: &str = r#"
-- Users are the tenancy boundary
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    login TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    created_at TEXT DEFAULT (datetime('now'))
);

-- Games collect replays; create-by-name is idempotent per owner
CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(user_id, name)
);

-- Replay metadata; the file bytes live on disk at file_path
CREATE TABLE IF NOT EXISTS replays (
    id TEXT PRIMARY KEY,
    game_id TEXT NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT,
    comment TEXT,
    original_name TEXT NOT NULL,
    file_path TEXT NOT NULL UNIQUE,    -- relative: {user_id}/{game_id}/{id}{ext}
    size_bytes INTEGER NOT NULL,
    compression TEXT NOT NULL DEFAULT 'none',
    compressed INTEGER NOT NULL DEFAULT 0,
    uploaded_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_games_user ON games(user_id);
CREATE INDEX IF NOT EXISTS idx_replays_game ON replays(game_id);
CREATE INDEX IF NOT EXISTS idx_replays_user ON replays(user_id);
CREATE INDEX IF NOT EXISTS idx_replays_uploaded ON replays(game_id, uploaded_at);
"#;
