//! Database schema and migrations for depot.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table
    r#"
-- Users table for authentication
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- Argon2 hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);
"#,
    // v2: files table - one row per folder, file, or image
    r#"
-- File records forming the per-user hierarchical namespace
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id     INTEGER NOT NULL REFERENCES users(id),
    name         TEXT NOT NULL,
    kind         TEXT NOT NULL,               -- 'folder', 'file', 'image'
    parent_id    INTEGER NOT NULL DEFAULT 0,  -- 0 = root, otherwise a folder id
    is_public    INTEGER NOT NULL DEFAULT 0,
    storage_path TEXT NOT NULL DEFAULT '',    -- empty for folders, set once otherwise
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner_parent ON files(owner_id, parent_id);
"#,
    // v3: jobs table backing the thumbnail queue
    r#"
-- Durable FIFO queue feeding the thumbnail worker
CREATE TABLE jobs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id     INTEGER NOT NULL,
    user_id     INTEGER NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',  -- 'pending', 'running', 'failed'
    error       TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_jobs_status ON jobs(status);
"#,
];
